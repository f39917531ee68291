//! Payment confirmation: backend intent, processor confirmation, status report.

pub mod checkout;
pub mod stripe;

pub use checkout::Checkout;
pub use stripe::StripeProcessor;

use async_trait::async_trait;
use std::fmt;

use crate::error::{ClientError, ClientResult};
use crate::models::ConfirmedIntent;

pub const PAYMENT_FAILED: &str = "Payment failed. Please try again.";
pub const STATUS_UPDATE_FAILED: &str =
    "Payment recorded but status update failed. Please contact support.";
pub const LOGIN_TO_PAY: &str = "Please log in to make a payment";

/// Opaque payment-method token produced by the processor's hosted card
/// element (`pm_...`). Card numbers never pass through this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    pub fn new(token: impl Into<String>) -> ClientResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ClientError::Payment("A payment method is required".to_string()));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PaymentMethod").field(&"<redacted>").finish()
    }
}

/// Confirms a payment intent with the card processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn confirm(
        &self,
        client_secret: &str,
        method: &PaymentMethod,
    ) -> ClientResult<ConfirmedIntent>;
}

/// Where a checkout ended up. The caller decides what to show for each.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Charged and marked paid. `amount` is in major units.
    Succeeded { request_id: u64, amount: f64 },
    /// Nothing was charged, or the charge did not succeed.
    Failed { request_id: u64, error: String },
    /// Charged, but the request could not be marked paid.
    StatusUpdateFailed { request_id: u64, message: String },
}

impl CheckoutOutcome {
    pub fn request_id(&self) -> u64 {
        match self {
            Self::Succeeded { request_id, .. }
            | Self::Failed { request_id, .. }
            | Self::StatusUpdateFailed { request_id, .. } => *request_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Collapse into a result, for callers that only care about success.
    pub fn into_result(self) -> ClientResult<f64> {
        match self {
            Self::Succeeded { amount, .. } => Ok(amount),
            Self::Failed { error, .. } => Err(ClientError::Payment(error)),
            Self::StatusUpdateFailed { message, .. } => Err(ClientError::PartialFailure(message)),
        }
    }
}
