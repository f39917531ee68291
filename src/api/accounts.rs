//! `/accounts/*` endpoints.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::json;

use super::{Access, ApiClient};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AuthResponse, LoginRequest, ProfileUpdate, RefreshResponse, RegisterData, User, UserPatch,
};

pub struct AccountsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AccountsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.client
            .call(Method::POST, "/accounts/login/", Access::Public, "Failed to login", |b| {
                b.json(&body)
            })
            .await
    }

    pub async fn register(&self, data: &RegisterData) -> ClientResult<AuthResponse> {
        self.client
            .call(
                Method::POST,
                "/accounts/register/",
                Access::Public,
                "Failed to register",
                |b| b.json(data),
            )
            .await
    }

    pub async fn logout(&self, refresh_token: &str) -> ClientResult<()> {
        self.client
            .call_empty(
                Method::POST,
                "/accounts/logout/",
                Access::Bearer,
                "Failed to logout",
                |b| b.json(&json!({ "refresh": refresh_token })),
            )
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ClientResult<RefreshResponse> {
        self.client
            .call(
                Method::POST,
                "/accounts/token/refresh/",
                Access::Public,
                "Failed to refresh session",
                |b| b.json(&json!({ "refresh": refresh_token })),
            )
            .await
    }

    pub async fn profile(&self) -> ClientResult<User> {
        self.client
            .call(
                Method::GET,
                "/accounts/profile/",
                Access::Bearer,
                "Failed to load profile",
                |b| b,
            )
            .await
    }

    /// Multipart PATCH; returns whatever subset of the profile the server echoes.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserPatch> {
        let mut form = Form::new();
        for (key, value) in update.text_fields() {
            form = form.text(key, value);
        }
        if let Some(path) = &update.avatar {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                ClientError::Storage(format!("Cannot read avatar {}: {}", path.display(), e))
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "avatar".to_string());
            form = form.part("avatar", Part::bytes(bytes).file_name(file_name));
        }

        self.client
            .call(
                Method::PATCH,
                "/accounts/profile/",
                Access::Bearer,
                "Failed to update profile",
                |b| b.multipart(form),
            )
            .await
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ClientResult<()> {
        self.client
            .call_empty(
                Method::POST,
                "/accounts/change-password/",
                Access::Bearer,
                "Failed to change password",
                |b| {
                    b.json(&json!({
                        "old_password": old_password,
                        "new_password": new_password,
                    }))
                },
            )
            .await
    }
}
