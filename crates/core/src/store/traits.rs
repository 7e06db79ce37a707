//! Item store trait.

use async_trait::async_trait;

use crate::stac::StacItem;

use super::error::StoreError;
use super::types::ItemLocator;

/// Reads and writes STAC item documents.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Loads the item at the locator; a missing backing file or object
    /// is [`StoreError::NotFound`].
    async fn get(&self, locator: &ItemLocator) -> Result<StacItem, StoreError>;

    /// Writes the item at the locator, overwriting any existing document.
    async fn put(&self, locator: &ItemLocator, item: &StacItem) -> Result<(), StoreError>;
}
