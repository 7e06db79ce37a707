//! The order workflow: per-item lifecycle from submission to terminal
//! catalog writes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::config::PollerConfig;
use crate::materializer::{Destination, MaterializedAsset, Materializer};
use crate::notify::{ItemChangedMessage, NotificationEmitter};
use crate::poller::{DataPoller, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use crate::stac::{
    regenerate_catalog, regenerate_collection, verify_coordinates, write_local_record, Asset,
    Catalog, CollectionDoc, OrderStatus, StacItem,
};
use crate::storage::{BlobStore, StorageError};
use crate::store::ItemStore;
use crate::vendor::{EndUser, OrderIntent, OrderReceipt, ProductBundle, ProviderRegistry};

use super::config::{BatchFailurePolicy, OrchestratorConfig};
use super::prepare::{prepare_batch, PreparedItem};
use super::types::{ItemOutcome, WorkflowError, WorkflowReport};

/// One workflow invocation.
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub workspace: String,
    pub workspace_bucket: String,
    /// Bucket where vendor deliveries land.
    pub landing_bucket: String,
    pub locators: Vec<crate::store::ItemLocator>,
    pub product_bundle: ProductBundle,
    /// Optional AOI override; when absent each item's own geometry
    /// limits the order.
    pub coordinates: Option<Vec<Vec<[f64; 2]>>>,
    pub licence: Option<String>,
    pub end_users: Vec<EndUser>,
}

/// Drives a batch of items through order, delivery, and catalog update.
pub struct OrderWorkflow {
    items: Arc<dyn ItemStore>,
    blobs: Arc<dyn BlobStore>,
    registry: ProviderRegistry,
    emitter: Arc<dyn NotificationEmitter>,
    config: OrchestratorConfig,
    poller: PollerConfig,
    shutdown: Option<watch::Receiver<bool>>,
}

impl OrderWorkflow {
    pub fn new(
        items: Arc<dyn ItemStore>,
        blobs: Arc<dyn BlobStore>,
        registry: ProviderRegistry,
        emitter: Arc<dyn NotificationEmitter>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            items,
            blobs,
            registry,
            emitter,
            config,
            poller: PollerConfig::default(),
            shutdown: None,
        }
    }

    /// Polls started by this workflow abort when the channel signals
    /// `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Replaces the stock polling cadence. Values a provider sets
    /// explicitly on its poll spec still win.
    pub fn with_poller(mut self, poller: PollerConfig) -> Self {
        self.poller = poller;
        self
    }

    /// Runs the batch. Preparation or validation problems abort before
    /// any submission; after that, items fail independently and the
    /// failure policy decides whether the batch continues.
    pub async fn run(&self, request: &WorkflowRequest) -> Result<WorkflowReport, WorkflowError> {
        if let Some(coordinates) = &request.coordinates {
            if !verify_coordinates(coordinates) {
                return Err(WorkflowError::Validation(
                    "invalid AOI override coordinates".to_string(),
                ));
            }
        }

        let prepared = prepare_batch(self.items.as_ref(), &request.locators).await?;
        // Resolve every provider up front so an unknown collection
        // aborts the run before anything is submitted.
        for item in &prepared {
            self.registry.resolve(&item.item.collection)?;
        }
        info!(items = prepared.len(), workspace = %request.workspace, "starting order batch");

        let mut report = WorkflowReport::default();
        for item in prepared {
            let outcome = self.process_item(item, request).await?;
            let failed = !outcome.succeeded();
            report.outcomes.push(outcome);
            if failed && self.config.on_item_failure == BatchFailurePolicy::Abort {
                warn!("item failed and failure policy is abort, stopping batch");
                break;
            }
        }
        Ok(report)
    }

    #[instrument(skip_all, fields(item = %prepared.item.id, acquisition = %prepared.acquisition_id))]
    async fn process_item(
        &self,
        prepared: PreparedItem,
        request: &WorkflowRequest,
    ) -> Result<ItemOutcome, WorkflowError> {
        let entry = self.registry.resolve(&prepared.item.collection)?.clone();
        let mut item = prepared.item.clone();
        let acquisition_id = prepared.acquisition_id.clone();

        // Duplicate guard: only a fresh item may be submitted. Ordered
        // or Shipping means a previous run already bought this
        // acquisition; a terminal record is not reopened.
        let status = item.status();
        if !matches!(status, OrderStatus::Orderable | OrderStatus::Pending) {
            let reason = format!("order for {acquisition_id} is already {status}");
            if status.is_terminal() {
                // The stored record keeps its terminal state; only the
                // report carries the failure.
                error!(reason = %reason, "order item failed");
                return Ok(ItemOutcome {
                    item_id: item.id.clone(),
                    acquisition_id: acquisition_id.clone(),
                    status: OrderStatus::Failed,
                    order_id: item.order_id().map(str::to_string),
                    failure_reason: Some(reason),
                    asset_count: item.assets.len(),
                });
            }
            return self
                .finish_failed(item, &prepared, request, reason, None)
                .await;
        }
        match entry.client.is_order_in_progress(&acquisition_id).await {
            Ok(true) => {
                let reason = format!(
                    "{} already has an order in progress for {acquisition_id}",
                    entry.client.name()
                );
                return self
                    .finish_failed(item, &prepared, request, reason, None)
                    .await;
            }
            Ok(false) => {}
            Err(e) => {
                let reason = format!("failed to check vendor order status: {e}");
                return self
                    .finish_failed(item, &prepared, request, reason, None)
                    .await;
            }
        }

        let coordinates = request
            .coordinates
            .clone()
            .unwrap_or_else(|| item.geometry.coordinates.clone());
        let intent = OrderIntent {
            acquisition_id: acquisition_id.clone(),
            collection_id: item.collection.clone(),
            coordinates,
            item_uuids: prepared.item_uuids.clone(),
            product_bundle: request.product_bundle.clone(),
            licence: request.licence.clone(),
            end_users: request.end_users.clone(),
        };

        let receipt = match entry.client.submit_order(&intent).await {
            Ok(receipt) => receipt,
            Err(e) => {
                let reason = format!("failed to submit order: {e}");
                return self
                    .finish_failed(item, &prepared, request, reason, None)
                    .await;
            }
        };
        info!(order_id = %receipt.order_id, "order submitted");

        // Persist Ordered before waiting for delivery, so the submission
        // is on record even if the run dies mid-poll.
        item.mark_ordered(&receipt.order_id)?;
        self.items.put(&prepared.locator, &item).await?;
        let item_key = self.upload_item(&item, request).await?;
        self.emitter
            .publish(&ItemChangedMessage::updated(
                &request.workspace_bucket,
                &item_key,
            ))
            .await;

        match self
            .retrieve_and_materialize(&entry, &receipt, &intent, request)
            .await
        {
            Ok(assets) => {
                for asset in &assets {
                    item.assets.insert(
                        asset.name.clone(),
                        Asset {
                            href: asset.href.clone(),
                            media_type: asset.media_type.clone(),
                            title: asset.title.clone(),
                            roles: Vec::new(),
                        },
                    );
                }
                item.mark_succeeded(&receipt.order_id)?;
                info!(assets = assets.len(), "order delivered");
                self.finish_terminal(item, &prepared, request).await
            }
            Err(e) => {
                let reason = format!("failed to retrieve data: {e}");
                self.finish_failed(
                    item,
                    &prepared,
                    request,
                    reason,
                    Some(receipt.order_id.clone()),
                )
                .await
            }
        }
    }

    async fn retrieve_and_materialize(
        &self,
        entry: &crate::vendor::ProviderEntry,
        receipt: &OrderReceipt,
        intent: &OrderIntent,
        request: &WorkflowRequest,
    ) -> Result<Vec<MaterializedAsset>, WorkflowError> {
        let mut spec = entry
            .client
            .poll_spec(receipt, intent, &request.landing_bucket);
        if spec.interval == DEFAULT_POLL_INTERVAL {
            spec = spec.with_interval(Duration::from_secs(self.poller.interval_secs));
        }
        if spec.timeout == DEFAULT_POLL_TIMEOUT {
            spec = spec.with_timeout(Duration::from_secs(self.poller.timeout_secs));
        }
        let mut poller = DataPoller::new(self.blobs.clone());
        if let Some(shutdown) = &self.shutdown {
            poller = poller.with_shutdown(shutdown.clone());
        }
        poller.poll(&spec).await?;

        // The rule only detects arrival; the delivery is everything the
        // vendor placed under the prefix.
        let delivered = self.blobs.list(&spec.bucket, &spec.prefix).await?;
        let dest = Destination {
            bucket: request.workspace_bucket.clone(),
            prefix: format!(
                "{}/commercial-data/{}",
                request.workspace, receipt.order_id
            ),
            workspace: request.workspace.clone(),
            workspaces_domain: self.config.workspaces_domain.clone(),
        };
        let assets = Materializer::new(self.blobs.clone())
            .materialize(&delivered, &dest, entry.classifier.as_ref())
            .await?;
        Ok(assets)
    }

    async fn finish_failed(
        &self,
        mut item: StacItem,
        prepared: &PreparedItem,
        request: &WorkflowRequest,
        reason: String,
        order_id: Option<String>,
    ) -> Result<ItemOutcome, WorkflowError> {
        error!(reason = %reason, "order item failed");
        item.mark_failed(reason, order_id)?;
        self.finish_terminal(item, prepared, request).await
    }

    /// Terminal write sequence shared by success and failure: persist
    /// the item, regenerate the workspace catalog documents, write the
    /// local record pair, publish one notification.
    async fn finish_terminal(
        &self,
        item: StacItem,
        prepared: &PreparedItem,
        request: &WorkflowRequest,
    ) -> Result<ItemOutcome, WorkflowError> {
        self.items.put(&prepared.locator, &item).await?;
        let item_key = self.upload_item(&item, request).await?;
        self.regenerate_remote_documents(&item, request).await?;
        write_local_record(&self.config.record_dir, &item).await?;
        self.emitter
            .publish(&ItemChangedMessage::updated(
                &request.workspace_bucket,
                &item_key,
            ))
            .await;

        Ok(ItemOutcome {
            item_id: item.id.clone(),
            acquisition_id: prepared.acquisition_id.clone(),
            status: item.status(),
            order_id: item.order_id().map(str::to_string),
            failure_reason: item.properties.failure_reason.clone(),
            asset_count: item.assets.len(),
        })
    }

    /// Uploads the item document to the workspace catalog tree and
    /// returns its key.
    async fn upload_item(
        &self,
        item: &StacItem,
        request: &WorkflowRequest,
    ) -> Result<String, WorkflowError> {
        let key = format!(
            "{}/{}/{}.json",
            self.collection_prefix(&item.collection, request),
            item.id,
            item.id
        );
        self.blobs
            .put_object(
                &request.workspace_bucket,
                &key,
                serde_json::to_vec_pretty(item)?,
                Some("application/json"),
            )
            .await?;
        Ok(key)
    }

    /// Merges this item into the workspace root catalog and collection
    /// documents. Regeneration converges: repeated runs add no
    /// duplicate links.
    async fn regenerate_remote_documents(
        &self,
        item: &StacItem,
        request: &WorkflowRequest,
    ) -> Result<(), WorkflowError> {
        let bucket = &request.workspace_bucket;

        let catalog_key = format!("{}/commercial-data/catalog.json", request.workspace);
        let existing: Option<Catalog> = self.read_document(bucket, &catalog_key).await?;
        let catalog = regenerate_catalog(existing, &item.collection);
        self.write_document(bucket, &catalog_key, &catalog).await?;

        let collection_key = format!(
            "{}/collection.json",
            self.collection_prefix(&item.collection, request)
        );
        let existing: Option<CollectionDoc> = self.read_document(bucket, &collection_key).await?;
        let item_key = format!("{}/{}.json", item.id, item.id);
        let collection = regenerate_collection(existing, &item.collection, &item_key);
        self.write_document(bucket, &collection_key, &collection)
            .await
    }

    fn collection_prefix(&self, collection: &str, request: &WorkflowRequest) -> String {
        format!("{}/commercial-data/{collection}", request.workspace)
    }

    async fn read_document<T: serde::de::DeserializeOwned>(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<T>, WorkflowError> {
        match self.blobs.get_object(bucket, key).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes).ok()),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document<T: serde::Serialize>(
        &self,
        bucket: &str,
        key: &str,
        document: &T,
    ) -> Result<(), WorkflowError> {
        self.blobs
            .put_object(
                bucket,
                key,
                serde_json::to_vec_pretty(document)?,
                Some("application/json"),
            )
            .await?;
        Ok(())
    }
}
