//! Object storage access behind the [`BlobStore`] trait.
//!
//! The workflow only needs list/get/put/copy/delete on buckets; the
//! production implementation is S3 (or any S3-compatible endpoint), and
//! tests use `testing::MemoryBlobStore`.

mod error;
mod s3;
mod traits;
mod types;

pub use error::StorageError;
pub use s3::{S3BlobStore, S3Config};
pub use traits::BlobStore;
pub use types::ObjectHandle;
