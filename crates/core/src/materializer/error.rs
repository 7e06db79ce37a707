//! Materializer error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors while materializing delivered data.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to extract archive '{name}': {message}")]
    Archive { name: String, message: String },

    #[error("invalid classification pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

impl MaterializeError {
    pub fn archive(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Archive {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
