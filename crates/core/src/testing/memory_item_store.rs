//! In-memory STAC item store for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::stac::StacItem;
use crate::store::{ItemLocator, ItemStore, StoreError};

/// In-memory [`ItemStore`] keyed by locator.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    items: Arc<RwLock<HashMap<String, StacItem>>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an item at a locator.
    pub async fn insert(&self, locator: &ItemLocator, item: StacItem) {
        self.items
            .write()
            .await
            .insert(locator.to_string(), item);
    }

    /// All (locator, item) pairs written so far, for assertions.
    pub async fn snapshot(&self) -> Vec<(String, StacItem)> {
        let items = self.items.read().await;
        let mut pairs: Vec<_> = items
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn get(&self, locator: &ItemLocator) -> Result<StacItem, StoreError> {
        self.items
            .read()
            .await
            .get(&locator.to_string())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(locator.clone()))
    }

    async fn put(&self, locator: &ItemLocator, item: &StacItem) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .insert(locator.to_string(), item.clone());
        Ok(())
    }
}
