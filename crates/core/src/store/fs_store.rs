//! Filesystem-backed item store.

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::stac::StacItem;

use super::error::StoreError;
use super::traits::ItemStore;
use super::types::ItemLocator;

/// Item store over local JSON files. Only `Path` locators are valid;
/// an `Object` locator is reported as not found.
#[derive(Debug, Default, Clone)]
pub struct FsItemStore;

impl FsItemStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ItemStore for FsItemStore {
    async fn get(&self, locator: &ItemLocator) -> Result<StacItem, StoreError> {
        let ItemLocator::Path { path } = locator else {
            return Err(StoreError::NotFound(locator.clone()));
        };

        let bytes = fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(locator.clone())
            } else {
                StoreError::Io {
                    locator: locator.clone(),
                    source: e,
                }
            }
        })?;

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Malformed {
            locator: locator.clone(),
            source: e,
        })
    }

    async fn put(&self, locator: &ItemLocator, item: &StacItem) -> Result<(), StoreError> {
        let ItemLocator::Path { path } = locator else {
            return Err(StoreError::NotFound(locator.clone()));
        };

        let bytes = serde_json::to_vec_pretty(item).map_err(|e| StoreError::Malformed {
            locator: locator.clone(),
            source: e,
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| StoreError::Io {
                locator: locator.clone(),
                source: e,
            })?;
        }

        fs::write(path, bytes).await.map_err(|e| StoreError::Io {
            locator: locator.clone(),
            source: e,
        })?;

        debug!(%locator, "wrote item document");
        Ok(())
    }
}
