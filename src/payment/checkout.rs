use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{
    CheckoutOutcome, PaymentMethod, PaymentProcessor, LOGIN_TO_PAY, PAYMENT_FAILED,
    STATUS_UPDATE_FAILED,
};
use crate::api::ApiClient;
use crate::config::{ConfirmationMode, PaymentConfig};
use crate::error::{ClientError, ClientResult};
use crate::hiring::can_pay;
use crate::models::{
    to_minor_units, HiringRequest, PaymentIntentRequest, PaymentIntentStatus, RequestStatus,
    RequestUpdate,
};

/// Runs one payment at a time for a request view.
///
/// Every attempt creates a new intent on the backend; there is no
/// idempotency key.
pub struct Checkout {
    api: ApiClient,
    processor: Arc<dyn PaymentProcessor>,
    mode: ConfirmationMode,
    currency: String,
    poll_attempts: u32,
    poll_interval: Duration,
    processing: AtomicBool,
}

struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Checkout {
    pub fn new(api: ApiClient, processor: Arc<dyn PaymentProcessor>, config: &PaymentConfig) -> Self {
        Self {
            api,
            processor,
            mode: config.confirmation,
            currency: config.currency.to_lowercase(),
            poll_attempts: config.webhook_poll_attempts.max(1),
            poll_interval: Duration::from_millis(config.webhook_poll_interval_ms),
            processing: AtomicBool::new(false),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    fn begin(&self) -> ClientResult<ProcessingGuard<'_>> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ProcessingGuard(&self.processing))
            .map_err(|_| ClientError::CheckoutInProgress)
    }

    /// Pay the quoted price of `request` with `method`.
    ///
    /// Precondition failures (no session, no quote, wrong status, another
    /// checkout running) are errors and touch nothing. Once the attempt has
    /// started, the result is always a [`CheckoutOutcome`].
    pub async fn pay(
        &self,
        request: &HiringRequest,
        method: &PaymentMethod,
    ) -> ClientResult<CheckoutOutcome> {
        let _guard = self.begin()?;

        if !self.api.session().is_authenticated() {
            return Err(ClientError::LoginRequired(LOGIN_TO_PAY.to_string()));
        }
        let price = can_pay(request)?;
        let amount = request
            .amount_minor_units()
            .unwrap_or_else(|| to_minor_units(price));

        info!(request_id = request.id, amount, currency = %self.currency, "Starting checkout");

        if let Err(e) = self.charge(request.id, amount, method).await {
            warn!(request_id = request.id, error = %e, "Payment failed");
            return Ok(CheckoutOutcome::Failed {
                request_id: request.id,
                error: e.to_string(),
            });
        }

        info!(request_id = request.id, "Payment succeeded");

        let outcome = match self.mode {
            ConfirmationMode::Client => self.mark_paid(request.id, price).await,
            ConfirmationMode::Webhook => self.await_paid(request.id, price).await,
        };
        Ok(outcome)
    }

    async fn charge(&self, request_id: u64, amount: i64, method: &PaymentMethod) -> ClientResult<()> {
        let client_secret = self
            .api
            .hiring()
            .create_payment_intent(&PaymentIntentRequest {
                amount,
                currency: self.currency.clone(),
                request_id,
            })
            .await?;

        let confirmed = self.processor.confirm(&client_secret, method).await?;
        if confirmed.status != PaymentIntentStatus::Succeeded {
            warn!(request_id, intent_id = %confirmed.id, status = %confirmed.status, "Payment not completed");
            return Err(ClientError::Payment(PAYMENT_FAILED.to_string()));
        }
        Ok(())
    }

    async fn mark_paid(&self, request_id: u64, price: f64) -> CheckoutOutcome {
        match self
            .api
            .hiring()
            .update_request(request_id, &RequestUpdate::status(RequestStatus::Paid))
            .await
        {
            Ok(_) => CheckoutOutcome::Succeeded {
                request_id,
                amount: price,
            },
            Err(e) => {
                error!(request_id, error = %e, "Charged but failed to mark request paid");
                CheckoutOutcome::StatusUpdateFailed {
                    request_id,
                    message: STATUS_UPDATE_FAILED.to_string(),
                }
            }
        }
    }

    async fn await_paid(&self, request_id: u64, price: f64) -> CheckoutOutcome {
        for attempt in 1..=self.poll_attempts {
            match self.api.hiring().get_request(request_id, None).await {
                Ok(request) if request.status == RequestStatus::Paid => {
                    return CheckoutOutcome::Succeeded {
                        request_id,
                        amount: price,
                    };
                }
                Ok(request) => {
                    info!(request_id, attempt, status = %request.status, "Waiting for payment webhook");
                }
                Err(e) => {
                    warn!(request_id, attempt, error = %e, "Failed to refresh request");
                }
            }
            if attempt < self.poll_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        error!(request_id, "Backend never reported the request as paid");
        CheckoutOutcome::StatusUpdateFailed {
            request_id,
            message: STATUS_UPDATE_FAILED.to_string(),
        }
    }
}
