//! Storage trait definitions

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

/// Bucket/key object storage
///
/// Keys are `/`-separated relative paths such as `keys/public`. Writes
/// overwrite; nothing in an exchange deletes objects.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object, replacing any previous content
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Retrieve an object
    ///
    /// Returns `StorageError::NotFound` if the object doesn't exist.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Check if an object exists
    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;
}

fn check_component(component: &str, whole: &str) -> StorageResult<()> {
    if component.is_empty() || component == "." || component == ".." {
        return Err(StorageError::InvalidKey(format!(
            "{whole:?} has an empty or relative component"
        )));
    }
    if component.contains(['\\', '\0']) {
        return Err(StorageError::InvalidKey(format!(
            "{whole:?} contains a forbidden character"
        )));
    }
    Ok(())
}

/// Reject keys that are empty, absolute or escape their bucket
pub fn validate_key(key: &str) -> StorageResult<()> {
    key.split('/').try_for_each(|c| check_component(c, key))
}

/// A bucket is a single key component
pub fn validate_bucket(bucket: &str) -> StorageResult<()> {
    if bucket.contains('/') {
        return Err(StorageError::InvalidKey(format!(
            "bucket {bucket:?} contains '/'"
        )));
    }
    check_component(bucket, bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        for key in [
            "keys/public",
            "inputs/encrypted_transactions",
            "outputs/encrypted_score",
            "tenant-a/keys/public",
            "single",
        ] {
            validate_key(key).unwrap();
        }
    }

    #[test]
    fn test_invalid_keys() {
        for key in ["", "/etc/passwd", "keys//public", "../secret", "keys/..", "keys/./x", "a\\b", "trailing/"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_buckets() {
        validate_bucket("alice_data").unwrap();
        assert!(validate_bucket("").is_err());
        assert!(validate_bucket("..").is_err());
        assert!(validate_bucket("a/b").is_err());
    }
}
