//! Wire models for the REST API, split into domain-specific modules.

pub mod account;
pub mod chat;
pub mod dashboard;
pub mod payment;
pub mod portfolio;
pub mod request;
pub mod service;
pub mod user;

pub use account::*;
pub use chat::*;
pub use dashboard::*;
pub use payment::*;
pub use portfolio::*;
pub use request::*;
pub use service::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// List endpoints answer either with a bare array or with a paginated envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Plain(Vec<T>),
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
    },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Plain(items) => items,
            Self::Paginated { results, .. } => results,
        }
    }
}

// Decimal fields arrive either as JSON numbers or as strings ("150.00").
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid amount: {}", s))),
        }
    }
}

pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    RawAmount::deserialize(deserializer)?.into_f64()
}

pub(crate) fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawAmount>::deserialize(deserializer)? {
        Some(raw) => raw.into_f64().map(Some),
        None => Ok(None),
    }
}
