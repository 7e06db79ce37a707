//! Poller error types.

use std::time::Duration;

use thiserror::Error;

use crate::storage::StorageError;

/// Errors from a polling run.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("no data arrived at s3://{bucket}/{prefix} within {timeout:?}")]
    Timeout {
        bucket: String,
        prefix: String,
        timeout: Duration,
    },

    #[error("polling cancelled by shutdown signal")]
    Cancelled,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
