//! Configuration types.

use serde::{Deserialize, Serialize};

use crate::orchestrator::OrchestratorConfig;
use crate::storage::S3Config;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub poller: PollerConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// When absent, notifications are logged instead of sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifier: Option<NotifierConfig>,
}

/// Buckets and S3 connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Bucket holding workspace catalogs and materialized assets.
    #[serde(default)]
    pub workspace_bucket: String,

    /// Bucket where vendor deliveries land.
    #[serde(default)]
    pub landing_bucket: String,

    #[serde(default)]
    pub s3: S3Config,
}

/// Polling cadence defaults; providers may override per order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_interval_secs() -> u64 {
    60
}

fn default_timeout_secs() -> u64 {
    86_400
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Webhook endpoint for item-changed notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub endpoint: String,
}
