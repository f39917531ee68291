//! Hiring request models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ServiceType, UserSummary};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Priced,
    Paid,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 6] = [
        Self::Pending,
        Self::Priced,
        Self::Paid,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Position along the forward lifecycle; `None` for `cancelled`.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Priced => Some(1),
            Self::Paid => Some(2),
            Self::InProgress => Some(3),
            Self::Completed => Some(4),
            Self::Cancelled => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Priced => "priced",
            Self::Paid => "paid",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Self::Pending),
            "priced" => Ok(Self::Priced),
            "paid" => Ok(Self::Paid),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown request status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// The service a request points at: the list endpoint nests the full
/// catalog entry, some responses only carry its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ServiceRef {
    Id(u64),
    Full(ServiceType),
}

impl ServiceRef {
    pub fn id(&self) -> u64 {
        match self {
            Self::Id(id) => *id,
            Self::Full(service) => service.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Full(service) => Some(&service.name),
        }
    }
}

/// Who asked for the work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requester<'a> {
    User(&'a UserSummary),
    Anonymous { name: &'a str, email: &'a str },
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HiringRequest {
    pub id: u64,
    pub ticket_number: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub service_type: Option<ServiceRef>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub status: RequestStatus,
    #[serde(default, deserialize_with = "super::deserialize_optional_amount")]
    pub quoted_price: Option<f64>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl HiringRequest {
    pub fn requester(&self) -> Requester<'_> {
        if let Some(user) = &self.user {
            return Requester::User(user);
        }
        match (self.name.as_deref(), self.email.as_deref()) {
            (Some(name), Some(email)) if !email.is_empty() => Requester::Anonymous { name, email },
            _ => Requester::Unknown,
        }
    }

    /// Quoted price in minor currency units (cents), as the processor expects.
    pub fn amount_minor_units(&self) -> Option<i64> {
        self.quoted_price.map(to_minor_units)
    }

    /// Check the price/status coupling the lifecycle relies on.
    pub fn check_invariants(&self) -> Result<(), String> {
        match (self.status, self.quoted_price) {
            (RequestStatus::Pending, Some(price)) => Err(format!(
                "request {} is pending but carries quoted price {:.2}",
                self.ticket_number, price
            )),
            (RequestStatus::Priced, None) => Err(format!(
                "request {} is priced but has no quoted price",
                self.ticket_number
            )),
            _ => Ok(()),
        }
    }
}

pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Body of `POST /requests/`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewHiringRequest {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    pub service_type: u64,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of `PATCH /hiring/requests/{id}/`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RequestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

impl RequestUpdate {
    pub fn status(status: RequestStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn priced(price: f64) -> Self {
        Self {
            status: Some(RequestStatus::Priced),
            quoted_price: Some(price),
            admin_notes: None,
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            admin_notes: Some(notes.into()),
            ..Default::default()
        }
    }
}

/// Query filters for `GET /hiring/requests/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub email: Option<String>,
    pub status: Option<RequestStatus>,
}

impl RequestFilter {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            status: None,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(email) = &self.email {
            pairs.push(("email", email.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.to_string()));
        }
        pairs
    }
}
