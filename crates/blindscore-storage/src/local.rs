//! Local filesystem storage backend

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{StorageError, StorageResult};
use crate::traits::{BlobStore, validate_bucket, validate_key};

/// Local filesystem storage
///
/// Objects live at `{root}/{bucket}/{key}`. Writes go to a temporary sibling
/// first and are renamed into place, so a reader never sees a partial object.
pub struct LocalBlobStore {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl LocalBlobStore {
    /// Create storage at the given root directory
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            tmp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        Ok(key
            .split('/')
            .fold(self.root.join(bucket), |path, part| path.join(part)))
    }

    fn temp_path(&self, path: &Path) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".tmp-{}-{n}", std::process::id()));
        path.with_file_name(name)
    }
}

/// Write `data` to `tmp`, then move it over `path`
async fn write_atomic(tmp: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(tmp, data).await?;
    fs::rename(tmp, path).await
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path(&path);
        if let Err(e) = write_atomic(&tmp, &path, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(bucket, key, bytes = data.len(), "stored object");
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(bucket, key))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        let path = self.object_path(bucket, key)?;
        Ok(fs::try_exists(&path).await?)
    }
}
