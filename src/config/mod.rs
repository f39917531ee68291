use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API, including the version prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// How a successful charge is turned into a `paid` request.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationMode {
    /// The client patches the request to `paid` after the processor confirms.
    #[default]
    Client,
    /// The backend's processor webhook marks the request; the client only polls.
    Webhook,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Processor publishable key (test or live). Required for checkout.
    pub publishable_key: Option<String>,
    /// Processor API root (default: https://api.stripe.com)
    #[serde(default = "default_processor_url")]
    pub processor_url: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub confirmation: ConfirmationMode,
    /// Number of request refreshes while waiting for the webhook (default: 10)
    #[serde(default = "default_webhook_poll_attempts")]
    pub webhook_poll_attempts: u32,
    /// Delay between refreshes in milliseconds (default: 1500)
    #[serde(default = "default_webhook_poll_interval_ms")]
    pub webhook_poll_interval_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            publishable_key: None,
            processor_url: default_processor_url(),
            currency: default_currency(),
            confirmation: ConfirmationMode::default(),
            webhook_poll_attempts: default_webhook_poll_attempts(),
            webhook_poll_interval_ms: default_webhook_poll_interval_ms(),
        }
    }
}

fn default_processor_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_webhook_poll_attempts() -> u32 {
    10
}

fn default_webhook_poll_interval_ms() -> u64 {
    1500
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted session file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./.hireflow")
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Conversation list refresh interval in seconds (default: 5)
    #[serde(default = "default_conversations_interval")]
    pub conversations_interval_secs: u64,
    /// Open conversation message refresh interval in seconds (default: 3)
    #[serde(default = "default_messages_interval")]
    pub messages_interval_secs: u64,
    /// Notification refresh interval in seconds (default: 30)
    #[serde(default = "default_notifications_interval")]
    pub notifications_interval_secs: u64,
    /// Upper bound for the error backoff in seconds (default: 300)
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            conversations_interval_secs: default_conversations_interval(),
            messages_interval_secs: default_messages_interval(),
            notifications_interval_secs: default_notifications_interval(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

fn default_conversations_interval() -> u64 {
    5
}

fn default_messages_interval() -> u64 {
    3
}

fn default_notifications_interval() -> u64 {
    30
}

fn default_max_backoff() -> u64 {
    300
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifecycleConfig {
    /// Restrict admin status changes to forward moves plus cancellation
    #[serde(default)]
    pub strict_transitions: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            payment: PaymentConfig::default(),
            storage: StorageConfig::default(),
            sync: SyncConfig::default(),
            lifecycle: LifecycleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }

    /// Apply command-line / environment overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        api_url: Option<&str>,
        publishable_key: Option<&str>,
        data_dir: Option<&Path>,
    ) -> Self {
        if let Some(url) = api_url {
            self.api.base_url = url.to_string();
        }
        if let Some(key) = publishable_key {
            self.payment.publishable_key = Some(key.to_string());
        }
        if let Some(dir) = data_dir {
            self.storage.data_dir = dir.to_path_buf();
        }
        self
    }
}
