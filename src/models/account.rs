//! Accounts as the admin user list sees them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_staff: bool,
    #[serde(default = "default_active", deserialize_with = "deserialize_active")]
    pub is_active: bool,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    pub fn role_label(&self) -> &'static str {
        if self.is_staff {
            "admin"
        } else {
            "user"
        }
    }
}

/// Body of `PATCH /auth/users/{id}/` when toggling staff rights.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StaffUpdate {
    pub is_staff: bool,
}

fn default_active() -> bool {
    true
}

// Staff flags have been seen as booleans, 0/1 and "true"/"false".
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl RawFlag {
    fn truthy(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Number(n) => n != 0,
            Self::Text(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawFlag>::deserialize(deserializer)?.is_some_and(RawFlag::truthy))
}

fn deserialize_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawFlag>::deserialize(deserializer)?.map_or(true, RawFlag::truthy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_flag_is_lenient() {
        let account: Account =
            serde_json::from_str(r#"{"id": 3, "email": "a@b.com", "is_staff": 1}"#).unwrap();
        assert!(account.is_staff);
        assert!(account.is_active);
        assert_eq!(account.role_label(), "admin");

        let account: Account =
            serde_json::from_str(r#"{"id": 3, "email": "a@b.com", "is_staff": null, "is_active": "false"}"#)
                .unwrap();
        assert!(!account.is_staff);
        assert!(!account.is_active);
    }

    #[test]
    fn test_full_name_skips_missing_parts() {
        let account: Account = serde_json::from_str(
            r#"{"id": 3, "email": "a@b.com", "first_name": "Grace", "last_login": "2026-10-18T07:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(account.full_name(), "Grace");
        assert!(account.last_login.is_some());
        assert!(account.date_joined.is_none());
    }
}
