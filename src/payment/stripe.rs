use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{PaymentMethod, PaymentProcessor, PAYMENT_FAILED};
use crate::config::PaymentConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{ConfirmedIntent, PaymentIntentStatus};

/// Confirms intents against the Stripe API with a publishable key, the same
/// call the browser SDK makes.
pub struct StripeProcessor {
    http: Client,
    base_url: String,
    publishable_key: String,
}

#[derive(Deserialize)]
struct IntentBody {
    id: String,
    status: PaymentIntentStatus,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl StripeProcessor {
    pub fn new(config: &PaymentConfig) -> ClientResult<Self> {
        let publishable_key = config
            .publishable_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ClientError::Payment("Payment processor is not configured".to_string())
            })?;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: config.processor_url.trim_end_matches('/').to_string(),
            publishable_key,
        })
    }
}

/// The intent id is the part of a client secret before `_secret_`.
pub fn intent_id_from_secret(client_secret: &str) -> ClientResult<&str> {
    match client_secret.split_once("_secret_") {
        Some((id, _)) if !id.is_empty() => Ok(id),
        _ => Err(ClientError::Payment("Malformed client secret".to_string())),
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn confirm(
        &self,
        client_secret: &str,
        method: &PaymentMethod,
    ) -> ClientResult<ConfirmedIntent> {
        let intent_id = intent_id_from_secret(client_secret)?;
        let url = format!("{}/v1/payment_intents/{}/confirm", self.base_url, intent_id);

        debug!(intent_id, "Confirming payment intent");

        let response = self
            .http
            .post(&url)
            .form(&[
                ("key", self.publishable_key.as_str()),
                ("client_secret", client_secret),
                ("payment_method", method.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| PAYMENT_FAILED.to_string());
            return Err(ClientError::Payment(message));
        }

        let intent: IntentBody = serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("payment intent: {}", e)))?;
        debug!(intent_id = %intent.id, status = %intent.status, "Payment intent confirmed");

        Ok(ConfirmedIntent {
            id: intent.id,
            status: intent.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBackend;

    #[test]
    fn test_intent_id_from_secret() {
        assert_eq!(intent_id_from_secret("pi_123_secret_abc").unwrap(), "pi_123");
        assert!(intent_id_from_secret("garbage").is_err());
        assert!(intent_id_from_secret("_secret_abc").is_err());
    }

    #[test]
    fn test_requires_publishable_key() {
        assert!(StripeProcessor::new(&PaymentConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_confirm_against_mock_processor() {
        let backend = MockBackend::start().await;
        let processor = StripeProcessor::new(&backend.payment_config()).unwrap();

        let ok = processor
            .confirm("pi_7_secret_x", &PaymentMethod::new("pm_card_visa").unwrap())
            .await
            .unwrap();
        assert_eq!(ok.id, "pi_7");
        assert_eq!(ok.status, PaymentIntentStatus::Succeeded);

        let declined = processor
            .confirm(
                "pi_8_secret_x",
                &PaymentMethod::new("pm_card_chargeDeclined").unwrap(),
            )
            .await
            .unwrap_err();
        assert_eq!(declined.to_string(), "Your card was declined.");

        let confirm = backend.state.lock().confirmations.clone();
        assert_eq!(confirm[0].0, "pi_7");
        assert_eq!(confirm[0].1, MockBackend::PUBLISHABLE_KEY);
    }
}
