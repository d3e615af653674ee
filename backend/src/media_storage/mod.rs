//! S3-based image storage operations

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use axum::body::Bytes;
use sha2::{Digest, Sha256};
use tracing::{debug, error};
use uuid::Uuid;

pub use error::{BucketError, BucketResult};

/// Content type used when the upload does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Remote object storage for uploaded images
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `body` under `key`
    ///
    /// # Errors
    ///
    /// Returns `BucketError` if the upload fails
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> BucketResult<()>;

    /// Public URL of the object stored under `key`
    fn object_url(&self, key: &str) -> String;
}

/// Image storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_base_url: String,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    /// * `public_base_url` - URL prefix that object keys are appended to
    #[must_use]
    pub fn new(s3_client: Arc<S3Client>, bucket_name: String, public_base_url: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Maps an uploader email to the key for a new image
    ///
    /// The email is hashed so that caller input never shapes the key's path:
    /// `{sha256(email)}/{timestamp_millis}_{uuid}.jpg`
    #[must_use]
    pub fn map_email_to_s3_key(email: &str, timestamp_millis: i64, id: Uuid) -> String {
        let owner = hex::encode(Sha256::digest(email.as_bytes()));
        format!("{owner}/{timestamp_millis}_{id}.jpg")
    }
}

#[async_trait]
impl ObjectStorage for MediaStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> BucketResult<()> {
        debug!(
            "Uploading {} bytes to {}/{} as {}",
            body.len(),
            self.bucket_name,
            key,
            content_type
        );

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload object {}: {}", key, e);
                BucketError::from(e)
            })?;

        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}
