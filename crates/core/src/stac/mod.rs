//! STAC item documents and the order lifecycle they carry.
//!
//! Items are plain JSON documents following the SpatioTemporal Asset
//! Catalog convention, extended with the order extension
//! (`order:status`, `order:id`). The status field is a closed enum
//! internally and a string only at the serde boundary.

mod catalog;
mod geometry;
mod status;
mod types;

pub use catalog::{
    regenerate_catalog, regenerate_collection, write_local_record, Catalog, CollectionDoc, Link,
    LocalRecord, ORDER_EXTENSION_URL,
};
pub use geometry::{verify_coordinates, verify_coordinates_value};
pub use status::StatusError;
pub use types::{Asset, Geometry, ItemProperties, OrderStatus, StacItem};
