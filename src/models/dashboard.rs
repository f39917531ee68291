//! Dashboard and analytics models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::HiringRequest;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceCount {
    pub service: String,
    pub count: u64,
}

/// `GET /dashboard/admin/admin_stats/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub pending_requests: u64,
    #[serde(default)]
    pub completed_requests: u64,
    #[serde(default, deserialize_with = "super::deserialize_amount")]
    pub total_revenue: f64,
    #[serde(default)]
    pub recent_requests: Vec<HiringRequest>,
    #[serde(default)]
    pub requests_by_status: Vec<StatusCount>,
    #[serde(default)]
    pub requests_by_service: Vec<ServiceCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub active_requests: u64,
    #[serde(default)]
    pub completed_requests: u64,
    #[serde(default, deserialize_with = "super::deserialize_amount")]
    pub total_spent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardNotice {
    pub id: u64,
    #[serde(default)]
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: u64,
    pub title: String,
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "super::deserialize_optional_amount")]
    pub quoted_price: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `GET /dashboard/user/dashboard/`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserDashboard {
    #[serde(default)]
    pub stats: UserStats,
    #[serde(default)]
    pub notifications: Vec<DashboardNotice>,
    #[serde(default)]
    pub recent_activities: Vec<Activity>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
}

impl std::fmt::Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(format!("Unknown grouping: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub group_by: GroupBy,
}

impl AnalyticsQuery {
    /// The trailing `days` window ending on `today`.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        Self {
            start_date: today - chrono::Duration::days(i64::from(days)),
            end_date: today,
            group_by: GroupBy::Day,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start_date", self.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", self.end_date.format("%Y-%m-%d").to_string()),
            ("group_by", self.group_by.to_string()),
        ]
    }
}

/// One bucket of `GET /dashboard/analytics/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsPoint {
    pub date: String,
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub completed_requests: u64,
    #[serde(default, deserialize_with = "super::deserialize_amount")]
    pub revenue: f64,
    #[serde(default)]
    pub response_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub total: f64,
    pub average: f64,
    /// Percentage change between the first and last bucket; `None` when it
    /// cannot be computed (one bucket, or a zero starting value).
    pub trend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    pub requests: Metric,
    pub revenue: Metric,
    pub completions: Metric,
}

impl AnalyticsSummary {
    pub fn from_points(points: &[AnalyticsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self {
            requests: metric(points, |p| p.total_requests as f64),
            revenue: metric(points, |p| p.revenue),
            completions: metric(points, |p| p.completed_requests as f64),
        })
    }
}

fn metric(points: &[AnalyticsPoint], value: impl Fn(&AnalyticsPoint) -> f64) -> Metric {
    let total: f64 = points.iter().map(&value).sum();
    let average = total / points.len() as f64;
    let trend = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => {
            let start = value(first);
            if start == 0.0 {
                None
            } else {
                Some((value(last) - start) / start * 100.0)
            }
        }
        _ => None,
    };
    Metric {
        total,
        average,
        trend,
    }
}
