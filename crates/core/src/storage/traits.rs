//! Object storage trait.

use async_trait::async_trait;

use super::error::StorageError;
use super::types::ObjectHandle;

/// Bucket-level object operations used by the workflow.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Lists all objects under a key prefix. An empty result is not an
    /// error; polling relies on that.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectHandle>, StorageError>;

    /// Reads a whole object into memory.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Writes an object, overwriting any existing one.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Server-side copy between locations.
    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<(), StorageError>;

    /// Deletes an object; deleting a missing object is not an error.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}
