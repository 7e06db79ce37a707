//! Object storage error types.

use thiserror::Error;

/// Errors from a [`super::BlobStore`] operation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("storage api error during {operation}: {message}")]
    Api { operation: String, message: String },

    #[error("failed to read object body: {0}")]
    Body(String),
}

impl StorageError {
    pub fn api(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}
