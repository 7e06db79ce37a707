//! Mock vendor client for testing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::poller::{MatchRule, PollSpec};
use crate::vendor::{OrderIntent, OrderReceipt, VendorError, VendorOrderClient};

/// Mock implementation of [`VendorOrderClient`].
///
/// Provides controllable behavior for testing:
/// - Record submitted intents for assertions
/// - Pin the acknowledged order id
/// - Mark acquisitions as already in progress
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// let vendor = MockVendorClient::new("airbus_sar");
/// vendor.set_order_id("SO-42").await;
///
/// let receipt = vendor.submit_order(&intent).await?;
/// assert_eq!(receipt.order_id, "SO-42");
/// assert_eq!(vendor.submitted().await.len(), 1);
/// ```
pub struct MockVendorClient {
    name: String,
    /// Recorded submit_order calls.
    submitted: Arc<RwLock<Vec<OrderIntent>>>,
    /// Order id returned by the next submissions.
    order_id: Arc<RwLock<String>>,
    /// Acquisitions reported as already in progress.
    in_progress: Arc<RwLock<HashSet<String>>>,
    /// If set, the next operation fails with this error.
    next_error: Arc<RwLock<Option<VendorError>>>,
}

impl MockVendorClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            submitted: Arc::new(RwLock::new(Vec::new())),
            order_id: Arc::new(RwLock::new("MOCK-ORDER-1".to_string())),
            in_progress: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Pin the order id acknowledged by subsequent submissions.
    pub async fn set_order_id(&self, order_id: impl Into<String>) {
        *self.order_id.write().await = order_id.into();
    }

    /// Report this acquisition as already having a vendor-side order.
    pub async fn set_in_progress(&self, acquisition_id: impl Into<String>) {
        self.in_progress.write().await.insert(acquisition_id.into());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: VendorError) {
        *self.next_error.write().await = Some(error);
    }

    /// All recorded submit_order calls.
    pub async fn submitted(&self) -> Vec<OrderIntent> {
        self.submitted.read().await.clone()
    }

    async fn take_error(&self) -> Option<VendorError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl VendorOrderClient for MockVendorClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_order_in_progress(&self, acquisition_id: &str) -> Result<bool, VendorError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.in_progress.read().await.contains(acquisition_id))
    }

    async fn submit_order(&self, intent: &OrderIntent) -> Result<OrderReceipt, VendorError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.submitted.write().await.push(intent.clone());
        Ok(OrderReceipt::new(self.order_id.read().await.clone()))
    }

    fn poll_spec(
        &self,
        receipt: &OrderReceipt,
        _intent: &OrderIntent,
        landing_bucket: &str,
    ) -> PollSpec {
        PollSpec::new(
            landing_bucket,
            format!("{}/", receipt.order_id),
            MatchRule::Any,
        )
        .with_interval(Duration::from_secs(1))
        .with_timeout(Duration::from_secs(30))
    }
}
