//! Testing utilities and mock implementations.
//!
//! In-memory stands-ins for every external seam of the workflow, so
//! end-to-end lifecycle tests run without object storage, catalog
//! files, vendor APIs, or a message broker.
//!
//! # Example
//!
//! ```rust,ignore
//! use stratus_core::testing::{MemoryBlobStore, MockVendorClient};
//!
//! let blobs = MemoryBlobStore::new();
//! let vendor = MockVendorClient::new("airbus_sar");
//! vendor.set_order_id("SO-1234").await;
//!
//! // Wire into the workflow...
//! ```

mod memory_blob_store;
mod memory_item_store;
mod mock_emitter;
mod mock_vendor_client;

pub use memory_blob_store::MemoryBlobStore;
pub use memory_item_store::MemoryItemStore;
pub use mock_emitter::MockEmitter;
pub use mock_vendor_client::MockVendorClient;

/// Test fixtures with reasonable defaults.
pub mod fixtures {
    use crate::stac::{Geometry, StacItem};
    use crate::vendor::{OrderIntent, ProductBundle};

    /// Square AOI polygon around the origin.
    pub fn aoi() -> Vec<Vec<[f64; 2]>> {
        vec![vec![
            [-0.5, -0.5],
            [0.5, -0.5],
            [0.5, 0.5],
            [-0.5, 0.5],
            [-0.5, -0.5],
        ]]
    }

    /// An orderable catalog item for the given collection.
    pub fn stac_item(id: &str, collection: &str, acquisition_id: &str) -> StacItem {
        let ring = aoi().remove(0);
        StacItem::new(id, collection, Geometry::polygon(ring), acquisition_id)
    }

    /// An order intent matching [`stac_item`].
    pub fn order_intent(acquisition_id: &str, collection: &str) -> OrderIntent {
        OrderIntent {
            acquisition_id: acquisition_id.to_string(),
            collection_id: collection.to_string(),
            coordinates: aoi(),
            item_uuids: vec![format!("uuid-{acquisition_id}")],
            product_bundle: ProductBundle::default_planet(),
            licence: None,
            end_users: Vec::new(),
        }
    }
}
