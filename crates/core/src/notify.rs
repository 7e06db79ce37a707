//! Item-change notifications.
//!
//! Every terminal catalog write publishes one [`ItemChangedMessage`] so
//! downstream consumers can re-harvest the workspace. Emission is
//! fire-and-forget: failures are logged and never fail the workflow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Payload describing a changed catalog object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemChangedMessage {
    pub id: String,
    pub workspace: String,
    pub bucket_name: String,
    pub added_keys: Vec<String>,
    pub updated_keys: Vec<String>,
    pub deleted_keys: Vec<String>,
    pub source: String,
    pub target: String,
}

impl ItemChangedMessage {
    /// Message for an updated object. The workspace is the first key
    /// segment and the file id the last.
    pub fn updated(bucket: &str, key: &str) -> Self {
        let workspace = key.split('/').next().unwrap_or_default().to_string();
        let file_id = key.rsplit('/').next().unwrap_or_default();
        Self {
            id: format!("{workspace}/order_item/{file_id}"),
            workspace: workspace.clone(),
            bucket_name: bucket.to_string(),
            added_keys: Vec::new(),
            updated_keys: vec![key.to_string()],
            deleted_keys: Vec::new(),
            source: workspace.clone(),
            target: format!("user-datasets/{workspace}"),
        }
    }
}

/// Publishes item-change messages.
#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    async fn publish(&self, message: &ItemChangedMessage);
}

/// POSTs each message as JSON to a configured endpoint.
pub struct WebhookEmitter {
    http: reqwest::Client,
    endpoint: String,
}

impl WebhookEmitter {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NotificationEmitter for WebhookEmitter {
    async fn publish(&self, message: &ItemChangedMessage) {
        let result = self
            .http
            .post(&self.endpoint)
            .json(message)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);
        match result {
            Ok(_) => info!(id = %message.id, "published item-changed notification"),
            Err(e) => warn!(id = %message.id, error = %e, "failed to publish notification"),
        }
    }
}

/// Logs messages instead of sending them. Used when no endpoint is
/// configured.
#[derive(Default)]
pub struct LogEmitter;

#[async_trait]
impl NotificationEmitter for LogEmitter {
    async fn publish(&self, message: &ItemChangedMessage) {
        info!(
            id = %message.id,
            bucket = %message.bucket_name,
            updated = message.updated_keys.len(),
            "item changed"
        );
    }
}
