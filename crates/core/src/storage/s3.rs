//! S3 implementation of [`BlobStore`].

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::SdkError,
    primitives::ByteStream,
    Client,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::error::StorageError;
use super::traits::BlobStore;
use super::types::ObjectHandle;

/// Connection settings for S3 or an S3-compatible endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct S3Config {
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Path-style addressing, required by most non-AWS endpoints.
    #[serde(default)]
    pub path_style: bool,
    /// Static credentials; when absent the default provider chain is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: "eu-central-1".to_string(),
            endpoint: None,
            path_style: false,
            access_key: None,
            secret_key: None,
        }
    }
}

/// S3-backed blob store.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    /// Builds a client from explicit settings. Without static keys the
    /// ambient AWS credential chain is used.
    pub async fn new(config: &S3Config) -> Self {
        let base = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&base)
            .force_path_style(config.path_style);

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            builder = builder.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "stratus-storage",
            ));
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Wraps an already-configured SDK client (ambient AWS environment).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn map_sdk_error<E, R>(operation: &str, bucket: &str, key: &str, err: SdkError<E, R>) -> StorageError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = match err.as_service_error() {
            Some(service) => service.to_string(),
            None => err.to_string(),
        };
        if message.contains("NoSuchKey") || message.contains("NotFound") {
            StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }
        } else {
            StorageError::api(operation, message)
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    #[instrument(skip(self))]
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectHandle>, StorageError> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Self::map_sdk_error("list_objects_v2", bucket, prefix, e))?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    objects.push(ObjectHandle::new(
                        bucket,
                        key,
                        object.size().unwrap_or(0) as u64,
                    ));
                }
            }

            match response.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        debug!(bucket, prefix, count = objects.len(), "listed objects");
        Ok(objects)
    }

    #[instrument(skip(self))]
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error("get_object", bucket, key, e))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Body(e.to_string()))?
            .into_bytes()
            .to_vec();

        debug!(bucket, key, bytes = data.len(), "downloaded object");
        Ok(data)
    }

    #[instrument(skip(self, body))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| Self::map_sdk_error("put_object", bucket, key, e))?;

        debug!(bucket, key, "uploaded object");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<(), StorageError> {
        self.client
            .copy_object()
            .copy_source(format!("{src_bucket}/{src_key}"))
            .bucket(dst_bucket)
            .key(dst_key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error("copy_object", src_bucket, src_key, e))?;

        debug!(src_bucket, src_key, dst_bucket, dst_key, "copied object");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error("delete_object", bucket, key, e))?;

        debug!(bucket, key, "deleted object");
        Ok(())
    }
}
