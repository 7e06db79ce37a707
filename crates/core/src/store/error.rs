//! Item store error types.

use thiserror::Error;

use crate::storage::StorageError;

use super::types::ItemLocator;

/// Errors from an [`super::ItemStore`] operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item not found: {0}")]
    NotFound(ItemLocator),

    #[error("item document at {locator} is not valid JSON: {source}")]
    Malformed {
        locator: ItemLocator,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to access {locator}: {source}")]
    Io {
        locator: ItemLocator,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
