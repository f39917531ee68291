//! Service catalog, hiring request and payment intent endpoints.

use reqwest::Method;
use serde::Deserialize;

use super::{Access, ApiClient};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    HiringRequest, ListResponse, NewHiringRequest, PaymentIntentRequest, PaymentIntentResponse,
    RequestFilter, RequestUpdate, ServiceType,
};

pub struct HiringApi<'a> {
    client: &'a ApiClient,
}

impl<'a> HiringApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn services(&self) -> ClientResult<Vec<ServiceType>> {
        let list: ListResponse<ServiceType> = self
            .client
            .call(
                Method::GET,
                "/hiring/services/",
                Access::Bearer,
                "Failed to load services",
                |b| b,
            )
            .await?;
        Ok(list.into_vec())
    }

    pub async fn list_requests(&self, filter: &RequestFilter) -> ClientResult<Vec<HiringRequest>> {
        let query = filter.query_pairs();
        let list: ListResponse<HiringRequest> = self
            .client
            .call(
                Method::GET,
                "/hiring/requests/",
                Access::Bearer,
                "Failed to load hiring requests",
                |b| b.query(&query),
            )
            .await?;
        Ok(list.into_vec())
    }

    /// Fetch one request. Anonymous requesters prove ownership with `email`.
    pub async fn get_request(&self, id: u64, email: Option<&str>) -> ClientResult<HiringRequest> {
        let path = format!("/hiring/requests/{}/", id);
        self.client
            .call(
                Method::GET,
                &path,
                Access::Bearer,
                "Failed to load hiring request",
                |b| match email {
                    Some(email) => b.query(&[("email", email)]),
                    None => b,
                },
            )
            .await
    }

    pub async fn create_request(&self, request: &NewHiringRequest) -> ClientResult<HiringRequest> {
        self.client
            .call(
                Method::POST,
                "/requests/",
                Access::Bearer,
                "Failed to create request",
                |b| b.json(request),
            )
            .await
    }

    pub async fn update_request(&self, id: u64, update: &RequestUpdate) -> ClientResult<HiringRequest> {
        let path = format!("/hiring/requests/{}/", id);
        self.client
            .call(
                Method::PATCH,
                &path,
                Access::Bearer,
                "Failed to update hiring request",
                |b| b.json(update),
            )
            .await
    }

    pub async fn delete_request(&self, id: u64) -> ClientResult<()> {
        let path = format!("/hiring/requests/{}/", id);
        self.client
            .call_empty(
                Method::DELETE,
                &path,
                Access::Bearer,
                "Failed to delete hiring request",
                |b| b,
            )
            .await
    }

    /// Ask the backend for a payment intent and return its client secret.
    ///
    /// Errors carry the server's `error` field, or `Server error: <status>
    /// <body>` when there is none.
    pub async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> ClientResult<String> {
        let raw = self
            .client
            .raw(
                Method::POST,
                "/create-payment-intent/",
                Access::Bearer,
                |b| b.json(request),
            )
            .await?;

        if !raw.status.is_success() {
            let message = intent_error(&raw.body).unwrap_or_else(|| {
                let details = if raw.body.trim().is_empty() {
                    "No error details"
                } else {
                    raw.body.trim()
                };
                format!("Server error: {} {}", raw.status.as_u16(), details)
            });
            return Err(ClientError::Payment(message));
        }

        let response: PaymentIntentResponse = serde_json::from_str(&raw.body)
            .map_err(|e| ClientError::Decode(format!("payment intent response: {}", e)))?;

        response
            .client_secret
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ClientError::Payment("No client secret received from server".to_string()))
    }
}

fn intent_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct IntentError {
        error: Option<String>,
    }

    serde_json::from_str::<IntentError>(body)
        .ok()
        .and_then(|e| e.error)
        .filter(|e| !e.is_empty())
}
