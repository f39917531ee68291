//! Account and profile models.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// The logged-in account as returned by the accounts endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.is_staff || self.role.as_deref() == Some("admin")
    }

    /// Overlay the fields a profile update returned onto this record.
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(first) = patch.first_name {
            self.first_name = first;
        }
        if let Some(last) = patch.last_name {
            self.last_name = last;
        }
        if let Some(staff) = patch.is_staff {
            self.is_staff = staff;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(bio) = patch.bio {
            self.bio = bio;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = avatar;
        }
    }
}

/// The fields a profile update echoes back. Outer `None` means the field was
/// absent; `Some(None)` means the server sent `null` and the value is cleared.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UserPatch {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar: Option<Option<String>>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Short user reference nested inside other resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
}

impl UserSummary {
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let joined = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let joined = joined.trim();
        if joined.is_empty() {
            self.email.clone()
        } else {
            joined.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(alias = "access")]
    pub token: String,
    #[serde(default, alias = "refresh")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    #[serde(alias = "access")]
    pub token: String,
    #[serde(default, alias = "refresh")]
    pub refresh_token: Option<String>,
}

/// Partial profile update, sent as multipart so an avatar can ride along.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<PathBuf>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.bio.is_none()
            && self.avatar.is_none()
    }

    /// Text fields that are set, in a fixed order.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("bio", &self.bio),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> User {
        User {
            id: 1,
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: Some("user".into()),
            is_staff: false,
            bio: None,
            avatar: None,
        }
    }

    #[test]
    fn test_merge_overlays_returned_fields() {
        let mut u = user();
        let patch: UserPatch =
            serde_json::from_value(json!({"first_name": "Augusta", "bio": "Analyst", "unknown": 3}))
                .unwrap();
        u.merge(patch);
        assert_eq!(u.first_name, "Augusta");
        assert_eq!(u.last_name, "Lovelace");
        assert_eq!(u.bio.as_deref(), Some("Analyst"));
        assert_eq!(u.role.as_deref(), Some("user"));
    }

    #[test]
    fn test_merge_null_clears_optional_fields() {
        let mut u = user();
        u.bio = Some("Analyst".into());
        u.avatar = Some("/media/a.png".into());

        let patch: UserPatch =
            serde_json::from_value(json!({"bio": null, "last_name": null})).unwrap();
        assert_eq!(patch.bio, Some(None));
        assert_eq!(patch.avatar, None);
        u.merge(patch);

        assert_eq!(u.bio, None);
        assert_eq!(u.avatar.as_deref(), Some("/media/a.png"));
        assert_eq!(u.last_name, "Lovelace");
    }

    #[test]
    fn test_admin_detection() {
        let mut u = user();
        assert!(!u.is_admin());
        u.is_staff = true;
        assert!(u.is_admin());
    }

    #[test]
    fn test_summary_display_name_fallbacks() {
        let s: UserSummary = serde_json::from_value(json!({"id": 2, "email": "x@y.z"})).unwrap();
        assert_eq!(s.display_name(), "x@y.z");
        let s: UserSummary =
            serde_json::from_value(json!({"id": 2, "email": "x@y.z", "first_name": "Grace"})).unwrap();
        assert_eq!(s.display_name(), "Grace");
    }

    #[test]
    fn test_auth_response_accepts_jwt_field_names() {
        let resp: AuthResponse = serde_json::from_value(json!({
            "user": {"id": 1, "email": "ada@example.com"},
            "access": "acc",
            "refresh": "ref"
        }))
        .unwrap();
        assert_eq!(resp.token, "acc");
        assert_eq!(resp.refresh_token.as_deref(), Some("ref"));
    }

    #[test]
    fn test_profile_update_text_fields() {
        let update = ProfileUpdate {
            last_name: Some("Hopper".into()),
            bio: Some("Admiral".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            update.text_fields(),
            vec![("last_name", "Hopper".to_string()), ("bio", "Admiral".to_string())]
        );
    }
}
