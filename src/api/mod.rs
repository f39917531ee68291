//! REST client for the hiring backend.
//!
//! [`ApiClient`] owns the HTTP connection pool and the base URL. It never keeps
//! an authorization header of its own: each call loads the current session
//! snapshot at dispatch time and sets the bearer token on that request only, so
//! a login or logout racing an in-flight call cannot change what that call
//! sends. Endpoint groups are exposed as borrowed views (`client.hiring()`,
//! `client.chat()`, `client.portfolio()`, ...).

pub mod accounts;
pub mod admin;
pub mod chat;
pub mod dashboard;
pub mod hiring;
pub mod portfolio;

pub use accounts::AccountsApi;
pub use admin::AdminApi;
pub use chat::ChatApi;
pub use dashboard::DashboardApi;
pub use hiring::HiringApi;
pub use portfolio::PortfolioApi;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionCell;

/// Whether a call carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    /// Never sends credentials (login, register, token refresh).
    Public,
    /// Sends the current token when a session exists.
    Bearer,
}

/// Status and body of a completed call, before error mapping.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    session: Arc<SessionCell>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionCell>) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent(format!("hireflow/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionCell> {
        &self.session
    }

    pub fn accounts(&self) -> AccountsApi<'_> {
        AccountsApi::new(self)
    }

    pub fn hiring(&self) -> HiringApi<'_> {
        HiringApi::new(self)
    }

    pub fn chat(&self) -> ChatApi<'_> {
        ChatApi::new(self)
    }

    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    pub fn portfolio(&self) -> PortfolioApi<'_> {
        PortfolioApi::new(self)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Dispatch a request with the credentials current at this moment.
    ///
    /// A 401 on a call that carried credentials clears the session, but only
    /// if those credentials are still the current ones.
    async fn send(
        &self,
        method: Method,
        path: &str,
        access: Access,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> ClientResult<Response> {
        let url = self.url(path);
        let credentials = match access {
            Access::Public => None,
            Access::Bearer => self.session.snapshot(),
        };

        let mut builder = self.http.request(method.clone(), &url);
        if let Some(creds) = &credentials {
            builder = builder.bearer_auth(&creds.token);
        }

        debug!(method = %method, url = %url, authenticated = credentials.is_some(), "API request");

        let response = build(builder).send().await?;
        let status = response.status();

        debug!(method = %method, url = %url, status = %status, "API response");

        if status == StatusCode::UNAUTHORIZED && access == Access::Bearer {
            if let Some(creds) = &credentials {
                if self.session.invalidate_if_current(creds) {
                    warn!(url = %url, "Credentials rejected by server, session cleared");
                }
            }
            return Err(ClientError::Unauthorized);
        }

        Ok(response)
    }

    /// Send a request and collect its status and body.
    pub(crate) async fn raw(
        &self,
        method: Method,
        path: &str,
        access: Access,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> ClientResult<RawResponse> {
        let response = self.send(method, path, access, build).await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }

    /// GET a binary body. Error bodies are mapped like JSON calls.
    pub(crate) async fn download(
        &self,
        path: &str,
        access: Access,
        fallback: &str,
    ) -> ClientResult<Vec<u8>> {
        let response = self.send(Method::GET, path, access, |b| b).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return check_status(RawResponse { status, body }, fallback).map(String::into_bytes);
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Send a request and decode a JSON success body.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        access: Access,
        fallback: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> ClientResult<T> {
        let raw = self.raw(method, path, access, build).await?;
        let body = check_status(raw, fallback)?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Send a request whose success body is irrelevant.
    pub(crate) async fn call_empty(
        &self,
        method: Method,
        path: &str,
        access: Access,
        fallback: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> ClientResult<()> {
        let raw = self.raw(method, path, access, build).await?;
        check_status(raw, fallback).map(|_| ())
    }
}

/// Map a non-success response to [`ClientError::Api`].
pub(crate) fn check_status(raw: RawResponse, fallback: &str) -> ClientResult<String> {
    if raw.status.is_success() {
        return Ok(raw.body);
    }
    let message = extract_server_message(&raw.body).unwrap_or_else(|| fallback.to_string());
    Err(ClientError::api(raw.status.as_u16(), message))
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `message`, `detail` and `error` first, then at field error maps
/// (`errors: {email: [..]}` or DRF-style top-level `{field: [..]}`).
pub fn extract_server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let fields = value.as_object()?;

    for key in ["message", "detail", "error"] {
        if let Some(text) = fields.get(key).and_then(first_text) {
            return Some(text);
        }
    }

    if let Some(errors) = fields.get("errors").and_then(Value::as_object) {
        if let Some(text) = errors.get("email").and_then(first_text) {
            return Some(text);
        }
        if let Some(text) = errors.values().find_map(first_text) {
            return Some(text);
        }
    }

    if let Some(text) = fields.get("non_field_errors").and_then(first_text) {
        return Some(text);
    }

    fields.iter().find_map(|(field, v)| {
        v.as_array()
            .and_then(|items| items.iter().find_map(Value::as_str))
            .map(|msg| format!("{}: {}", field, msg))
    })
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::AUTH_TOKEN_KEY;
    use crate::test_support::MockBackend;

    #[test]
    fn test_extract_message_priority() {
        assert_eq!(
            extract_server_message(r#"{"message": "Invalid credentials", "detail": "x"}"#),
            Some("Invalid credentials".to_string())
        );
        assert_eq!(
            extract_server_message(r#"{"detail": "Not found."}"#),
            Some("Not found.".to_string())
        );
        assert_eq!(
            extract_server_message(r#"{"error": "No price quoted yet"}"#),
            Some("No price quoted yet".to_string())
        );
    }

    #[test]
    fn test_extract_message_from_field_errors() {
        assert_eq!(
            extract_server_message(
                r#"{"errors": {"password": ["Too short"], "email": ["Email already registered"]}}"#
            ),
            Some("Email already registered".to_string())
        );
        assert_eq!(
            extract_server_message(r#"{"title": ["This field is required."]}"#),
            Some("title: This field is required.".to_string())
        );
    }

    #[test]
    fn test_extract_message_rejects_non_json() {
        assert_eq!(extract_server_message("<html>502</html>"), None);
        assert_eq!(extract_server_message(r#"{"message": ""}"#), None);
    }

    #[test]
    fn test_check_status_uses_fallback() {
        let raw = RawResponse {
            status: StatusCode::BAD_REQUEST,
            body: String::new(),
        };
        let err = check_status(raw, "Failed to create request").unwrap_err();
        assert_eq!(err.to_string(), "Failed to create request");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_expired_token_clears_session() {
        let backend = MockBackend::start().await;
        let (api, store) = backend.client();
        backend.login_expired(&api);

        let err = api.chat().conversations().await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Session expired, please log in again");
        assert!(!api.session().is_authenticated());
        assert!(store.get(AUTH_TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn test_rejection_of_old_token_keeps_new_login() {
        let backend = MockBackend::start().await;
        let (api, _) = backend.client();
        let stale = backend.login_expired(&api);
        backend.login_user(&api);

        assert!(!api.session().invalidate_if_current(&stale));
        assert!(api.chat().conversations().await.is_ok());
        assert!(api.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_public_call_failure_leaves_session_alone() {
        let backend = MockBackend::start().await;
        let (api, _) = backend.client();
        backend.login_user(&api);

        let err = api.accounts().login("user@example.com", "wrong").await.unwrap_err();

        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
        assert!(api.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_bearer_call_without_session() {
        let backend = MockBackend::start().await;
        let (api, _) = backend.client();
        assert!(api.chat().notifications().await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_not_found_uses_detail() {
        let backend = MockBackend::start().await;
        let (api, _) = backend.client();
        let err = api.hiring().get_request(404, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Not found.");
        assert_eq!(err.status(), Some(404));
    }
}
