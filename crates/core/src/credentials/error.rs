//! Credential error types.

use thiserror::Error;

/// Errors from credential lookup or decryption.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("no credential configured for scope '{0}'")]
    NotFound(String),

    #[error("credential payload for scope '{scope}' is malformed: {reason}")]
    Malformed { scope: String, reason: String },

    #[error("decryption failed: {0}")]
    Decrypt(String),
}
