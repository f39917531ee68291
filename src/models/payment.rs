//! Payment intent DTOs.

use serde::{Deserialize, Serialize};

/// Body of `POST /create-payment-intent/`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Amount in minor currency units
    pub amount: i64,
    /// ISO 4217 code, lowercase
    pub currency: String,
    pub request_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentResponse {
    #[serde(rename = "clientSecret", default)]
    pub client_secret: Option<String>,
}

/// Processor-side status of a payment intent after confirmation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    Succeeded,
    Processing,
    RequiresAction,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresCapture,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Succeeded => "succeeded",
            Self::Processing => "processing",
            Self::RequiresAction => "requires_action",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// What the processor reported for one confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedIntent {
    pub id: String,
    pub status: PaymentIntentStatus,
}
