pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod hiring;
pub mod models;
pub mod payment;
pub mod session;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use api::ApiClient;
pub use error::{ClientError, ClientResult};

use anyhow::{Context, Result};
use config::Config;
use hiring::{HiringService, TransitionPolicy};
use payment::{Checkout, StripeProcessor};
use session::{FileStore, KeyValueStore, SessionCell, SessionStore};
use std::sync::Arc;

/// Everything a front end needs, wired from one [`Config`].
pub struct Hireflow {
    pub config: Config,
    pub api: ApiClient,
    pub session: SessionStore,
    pub hiring: HiringService,
}

impl Hireflow {
    /// Open the on-disk store in the configured data directory and restore
    /// whatever session it holds.
    pub fn open(config: Config) -> Result<Self> {
        let store = FileStore::open(&config.storage.data_dir).with_context(|| {
            format!(
                "Failed to open data directory {}",
                config.storage.data_dir.display()
            )
        })?;
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let cell = Arc::new(SessionCell::rehydrate(store));
        let api = ApiClient::new(&config.api, cell).context("Failed to create HTTP client")?;
        let policy = TransitionPolicy::from_strict(config.lifecycle.strict_transitions);

        Ok(Self {
            session: SessionStore::new(api.clone()),
            hiring: HiringService::new(api.clone(), policy),
            api,
            config,
        })
    }

    /// Build a checkout against the configured processor. Fails when no
    /// publishable key is set.
    pub fn checkout(&self) -> ClientResult<Checkout> {
        let processor = StripeProcessor::new(&self.config.payment)?;
        Ok(Checkout::new(
            self.api.clone(),
            Arc::new(processor),
            &self.config.payment,
        ))
    }
}
