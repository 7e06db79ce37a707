//! STAC item persistence behind the [`ItemStore`] trait.
//!
//! Items live either as local JSON files or as objects in a bucket; the
//! locator says which. No caching, no locking: last write wins, matching
//! single-run batch semantics.

mod error;
mod fs_store;
mod object_store;
mod traits;
mod types;

pub use error::StoreError;
pub use fs_store::FsItemStore;
pub use object_store::ObjectItemStore;
pub use traits::ItemStore;
pub use types::ItemLocator;
