//! Admin user management endpoints.

use reqwest::Method;

use super::{Access, ApiClient};
use crate::error::ClientResult;
use crate::models::{Account, ListResponse, StaffUpdate};

pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn users(&self) -> ClientResult<Vec<Account>> {
        let list: ListResponse<Account> = self
            .client
            .call(Method::GET, "/auth/users/", Access::Bearer, "Failed to fetch users", |b| b)
            .await?;
        Ok(list.into_vec())
    }

    pub async fn user(&self, id: u64) -> ClientResult<Account> {
        let path = format!("/auth/users/{}/", id);
        self.client
            .call(Method::GET, &path, Access::Bearer, "Failed to fetch user", |b| b)
            .await
    }

    /// Grant or revoke admin rights.
    pub async fn set_staff(&self, id: u64, is_staff: bool) -> ClientResult<Account> {
        let path = format!("/auth/users/{}/", id);
        self.client
            .call(Method::PATCH, &path, Access::Bearer, "Failed to update user", |b| {
                b.json(&StaffUpdate { is_staff })
            })
            .await
    }
}
