//! In-memory storage backend (for testing)

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::traits::{BlobStore, validate_bucket, validate_key};

/// In-memory storage for unit tests
///
/// Thread-safe via `RwLock`. Not persistent; data is lost on drop.
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects across all buckets
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys present in `bucket`, sorted
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> StorageResult<()> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::not_found(bucket, key))
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        Ok(self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(bucket.to_string(), key.to_string())))
    }
}
