//! Admin and user dashboard endpoints.

use reqwest::Method;

use super::{Access, ApiClient};
use crate::error::ClientResult;
use crate::models::{AdminStats, AnalyticsPoint, AnalyticsQuery, ListResponse, UserDashboard};

pub struct DashboardApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DashboardApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn admin_stats(&self) -> ClientResult<AdminStats> {
        self.client
            .call(
                Method::GET,
                "/dashboard/admin/admin_stats/",
                Access::Bearer,
                "Failed to load dashboard statistics",
                |b| b,
            )
            .await
    }

    pub async fn user_dashboard(&self) -> ClientResult<UserDashboard> {
        self.client
            .call(
                Method::GET,
                "/dashboard/user/dashboard/",
                Access::Bearer,
                "Failed to load dashboard",
                |b| b,
            )
            .await
    }

    pub async fn analytics(&self, query: &AnalyticsQuery) -> ClientResult<Vec<AnalyticsPoint>> {
        let pairs = query.query_pairs();
        let list: ListResponse<AnalyticsPoint> = self
            .client
            .call(
                Method::GET,
                "/dashboard/analytics/",
                Access::Bearer,
                "Failed to load analytics",
                |b| b.query(&pairs),
            )
            .await?;
        Ok(list.into_vec())
    }
}
