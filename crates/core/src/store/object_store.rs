//! Object-storage-backed item store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::stac::StacItem;
use crate::storage::{BlobStore, StorageError};

use super::error::StoreError;
use super::traits::ItemStore;
use super::types::ItemLocator;

/// Item store over a [`BlobStore`]. Only `Object` locators are valid.
#[derive(Clone)]
pub struct ObjectItemStore {
    blobs: Arc<dyn BlobStore>,
}

impl ObjectItemStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }
}

#[async_trait]
impl ItemStore for ObjectItemStore {
    async fn get(&self, locator: &ItemLocator) -> Result<StacItem, StoreError> {
        let ItemLocator::Object { bucket, key } = locator else {
            return Err(StoreError::NotFound(locator.clone()));
        };

        let bytes = match self.blobs.get_object(bucket, key).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound { .. }) => {
                return Err(StoreError::NotFound(locator.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Malformed {
            locator: locator.clone(),
            source: e,
        })
    }

    async fn put(&self, locator: &ItemLocator, item: &StacItem) -> Result<(), StoreError> {
        let ItemLocator::Object { bucket, key } = locator else {
            return Err(StoreError::NotFound(locator.clone()));
        };

        let bytes = serde_json::to_vec_pretty(item).map_err(|e| StoreError::Malformed {
            locator: locator.clone(),
            source: e,
        })?;

        self.blobs
            .put_object(bucket, key, bytes, Some("application/json"))
            .await?;

        debug!(%locator, "wrote item document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stac::Geometry;
    use crate::testing::MemoryBlobStore;

    #[tokio::test]
    async fn test_round_trip_through_bucket() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let store = ObjectItemStore::new(blobs.clone());
        let locator = ItemLocator::object("items", "airbus_sar_data/acq-001.json");

        let item = StacItem::new(
            "acq-001",
            "airbus_sar_data",
            Geometry::polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]),
            "SAR-12345",
        );

        store.put(&locator, &item).await.unwrap();
        let loaded = store.get(&locator).await.unwrap();
        assert_eq!(loaded, item);
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let store = ObjectItemStore::new(Arc::new(MemoryBlobStore::new()));
        let locator = ItemLocator::object("items", "missing.json");
        let err = store.get(&locator).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
