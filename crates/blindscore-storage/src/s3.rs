//! S3-compatible storage backend (Minio, AWS S3, Backblaze, etc.)

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{StorageError, StorageResult};
use crate::traits::{BlobStore, validate_bucket, validate_key};

/// S3-compatible storage
///
/// By default every logical bucket is an S3 bucket. With a physical bucket
/// configured, logical buckets become key prefixes inside it:
///
/// ```text
/// {physical}/
///   {bucket}/{key}
/// ```
///
/// which also allows logical names S3 would reject, such as `alice_data`.
pub struct S3BlobStore {
    client: Client,
    physical_bucket: Option<String>,
}

impl S3BlobStore {
    /// Create from existing AWS SDK client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            physical_bucket: None,
        }
    }

    /// Store every logical bucket under one physical bucket
    pub fn with_physical_bucket(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            physical_bucket: Some(bucket.into()),
        }
    }

    /// Create configured for an S3-compatible endpoint such as Minio
    ///
    /// Expects environment variables:
    /// - `MINIO_ACCESS_KEY` (default: minioadmin)
    /// - `MINIO_SECRET_KEY` (default: minioadmin)
    pub fn minio(endpoint: impl Into<String>, physical_bucket: Option<String>) -> Self {
        let access_key = std::env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".into());
        let secret_key = std::env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".into());

        let creds =
            aws_sdk_s3::config::Credentials::new(access_key, secret_key, None, None, "minio");

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(endpoint)
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .credentials_provider(creds)
            .force_path_style(true) // Required for Minio
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .build();

        Self {
            client: Client::from_conf(config),
            physical_bucket,
        }
    }

    /// Ensure the bucket backing `bucket` exists (call on startup)
    pub async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()> {
        let (physical, _) = self.locate(bucket, "probe")?;
        match self.client.create_bucket().bucket(&physical).send().await {
            Ok(_) => Ok(()),
            Err(e) => match self.client.head_bucket().bucket(&physical).send().await {
                Ok(_) => Ok(()),
                Err(_) => Err(StorageError::Backend(format!(
                    "Failed to create or access bucket {physical}: {e}"
                ))),
            },
        }
    }

    /// Physical bucket and object key for a logical location
    fn locate(&self, bucket: &str, key: &str) -> StorageResult<(String, String)> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        Ok(match &self.physical_bucket {
            Some(physical) => (physical.clone(), format!("{bucket}/{key}")),
            None => (bucket.to_string(), key.to_string()),
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> StorageResult<()> {
        let (physical, object) = self.locate(bucket, key)?;

        self.client
            .put_object()
            .bucket(&physical)
            .key(&object)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 PUT failed: {e}")))?;

        tracing::debug!(bucket = %physical, key = %object, bytes = data.len(), "stored object");
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let (physical, object) = self.locate(bucket, key)?;

        let response = self
            .client
            .get_object()
            .bucket(&physical)
            .key(&object)
            .send()
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    StorageError::not_found(bucket, key)
                } else {
                    StorageError::Backend(format!("S3 GET failed: {e}"))
                }
            })?;

        Ok(response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to read body: {e}")))?
            .into_bytes()
            .to_vec())
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        let (physical, object) = self.locate(bucket, key)?;

        match self
            .client
            .head_object()
            .bucket(&physical)
            .key(&object)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(StorageError::Backend(format!("S3 HEAD failed: {e}"))),
        }
    }
}

fn is_not_found<E>(err: &SdkError<E>) -> bool {
    matches!(err, SdkError::ServiceError(e) if e.raw().status().as_u16() == 404)
}
