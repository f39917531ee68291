//! Service catalog models.

use serde::{Deserialize, Serialize};

/// A catalog entry a hiring request refers to. Read-only for clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceType {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "super::deserialize_amount")]
    pub base_price: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub order: i32,
}

fn default_active() -> bool {
    true
}

/// Keep only active services, in catalog order.
pub fn active_services(mut services: Vec<ServiceType>) -> Vec<ServiceType> {
    services.retain(|s| s.is_active);
    services.sort_by_key(|s| (s.order, s.id));
    services
}
