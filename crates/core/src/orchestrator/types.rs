//! Workflow errors and the per-run report.

use serde::Serialize;
use thiserror::Error;

use crate::materializer::MaterializeError;
use crate::poller::PollError;
use crate::stac::{OrderStatus, StatusError};
use crate::storage::StorageError;
use crate::store::StoreError;
use crate::vendor::VendorError;

/// Errors that abort the run (as opposed to per-item failures, which
/// are recorded on the item and in the report).
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Batch preparation or input validation failed; nothing was
    /// submitted.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Final state of one item after a run.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub item_id: String,
    pub acquisition_id: String,
    pub status: OrderStatus,
    pub order_id: Option<String>,
    pub failure_reason: Option<String>,
    pub asset_count: usize,
}

impl ItemOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == OrderStatus::Succeeded
    }
}

/// Per-item outcomes of one workflow run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl WorkflowReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(ItemOutcome::succeeded)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }
}
