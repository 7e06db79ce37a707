//! Item locator type.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where an item document lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemLocator {
    /// Local JSON file.
    Path { path: PathBuf },
    /// Object in a bucket.
    Object { bucket: String, key: String },
}

impl ItemLocator {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path { path: path.into() }
    }

    pub fn object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Object {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parses the CLI locator form: `s3://bucket/key` or a plain path.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix("s3://") {
            Some(rest) => match rest.split_once('/') {
                Some((bucket, key)) => Self::object(bucket, key),
                None => Self::object(rest, ""),
            },
            None => Self::path(raw),
        }
    }
}

impl std::fmt::Display for ItemLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemLocator::Path { path } => write!(f, "{}", path.display()),
            ItemLocator::Object { bucket, key } => write!(f, "s3://{bucket}/{key}"),
        }
    }
}
