use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Credentials, SessionCell};
use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{AuthResponse, ProfileUpdate, RegisterData, User};

/// Login, logout and profile operations on top of a [`SessionCell`].
#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn cell(&self) -> &Arc<SessionCell> {
        self.api.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cell().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.cell().current_user()
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let response = self.api.accounts().login(email, password).await?;
        let user = self.establish(response)?;
        info!(user_id = user.id, "Logged in");
        Ok(user)
    }

    pub async fn register(&self, data: RegisterData) -> ClientResult<User> {
        let response = self.api.accounts().register(&data).await?;
        let user = self.establish(response)?;
        info!(user_id = user.id, "Registered account");
        Ok(user)
    }

    /// End the session. The server call is best effort; local state is
    /// cleared no matter what it returns.
    pub async fn logout(&self) {
        if let Some(refresh) = self.cell().snapshot().and_then(|c| c.refresh_token.clone()) {
            if let Err(e) = self.api.accounts().logout(&refresh).await {
                warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }
        self.cell().clear();
        info!("Logged out");
    }

    /// Exchange the refresh token for a new access token.
    pub async fn refresh(&self) -> ClientResult<()> {
        let current = self.cell().snapshot().ok_or_else(not_logged_in)?;
        let refresh = current
            .refresh_token
            .clone()
            .ok_or_else(|| ClientError::LoginRequired("No refresh token stored".to_string()))?;

        let response = match self.api.accounts().refresh(&refresh).await {
            Ok(response) => response,
            Err(e) => {
                if e.status() == Some(401) {
                    self.cell().invalidate_if_current(&current);
                    return Err(ClientError::Unauthorized);
                }
                return Err(e);
            }
        };

        let next = Credentials {
            token: response.token,
            refresh_token: response.refresh_token.or(Some(refresh)),
            user: current.user.clone(),
        };
        if self.cell().replace_if_current(&current, next)?.is_none() {
            // logged out or replaced while the refresh was in flight
            return if self.is_authenticated() {
                Ok(())
            } else {
                Err(not_logged_in())
            };
        }
        debug!(user_id = current.user.id, "Access token refreshed");
        Ok(())
    }

    /// Send a partial update and merge what comes back into the stored user.
    pub async fn update_profile(&self, update: ProfileUpdate) -> ClientResult<User> {
        let current = self.cell().snapshot().ok_or_else(not_logged_in)?;
        if update.is_empty() {
            return Ok(current.user.clone());
        }

        let patch = self.api.accounts().update_profile(&update).await?;
        let mut user = current.user.clone();
        user.merge(patch);
        if !self.cell().update_user(&current, user.clone())? {
            return Err(ClientError::LoginRequired(
                "Session ended before the profile could be updated locally".to_string(),
            ));
        }
        info!(user_id = user.id, "Profile updated");
        Ok(user)
    }

    /// Load the profile from the server and refresh the stored copy.
    pub async fn fetch_profile(&self) -> ClientResult<User> {
        let current = self.cell().snapshot().ok_or_else(not_logged_in)?;
        let user = self.api.accounts().profile().await?;
        self.cell().update_user(&current, user.clone())?;
        Ok(user)
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ClientResult<()> {
        if !self.is_authenticated() {
            return Err(not_logged_in());
        }
        self.api
            .accounts()
            .change_password(old_password, new_password)
            .await?;
        info!("Password changed");
        Ok(())
    }

    fn establish(&self, response: AuthResponse) -> ClientResult<User> {
        let user = response.user.clone();
        self.cell().install(Credentials {
            token: response.token,
            refresh_token: response.refresh_token,
            user: response.user,
        })?;
        Ok(user)
    }
}

fn not_logged_in() -> ClientError {
    ClientError::LoginRequired("Please log in first".to_string())
}
