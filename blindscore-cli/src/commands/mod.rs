pub mod compute;
pub mod config;
pub mod owner;

use std::path::Path;
use std::sync::Arc;

use blindscore_core::BackendId;
use blindscore_storage::{BlobStore, LocalBlobStore};

use crate::config::Config;

/// Global context passed to all commands
pub struct Context {
    pub json_output: bool,
    pub backend_override: Option<String>,
    pub config: Config,
    pub verbose: bool,
}

impl Context {
    /// Resolve which backend to use, with priority:
    /// 1. --backend CLI flag
    /// 2. Config file `backend`
    pub fn backend_id(&self) -> anyhow::Result<BackendId> {
        let name = self
            .backend_override
            .as_deref()
            .unwrap_or(&self.config.backend);
        let id: BackendId = name.parse().map_err(|e| anyhow::anyhow!("{e}"))?;
        if id == BackendId::Mock {
            tracing::warn!("mock backend selected: ciphertexts are NOT encrypted");
        }
        Ok(id)
    }

    /// Open the configured mailbox store
    pub async fn store(&self) -> anyhow::Result<Arc<dyn BlobStore>> {
        let storage = &self.config.storage;
        match storage.backend.as_str() {
            "local" => {
                let store = LocalBlobStore::new(Path::new(&storage.local_path)).await?;
                tracing::debug!(root = %store.root().display(), "using local store");
                Ok(Arc::new(store))
            }
            "s3" => self.s3_store().await,
            other => anyhow::bail!("Unknown storage backend '{other}'. Valid: local, s3"),
        }
    }

    #[cfg(feature = "s3")]
    async fn s3_store(&self) -> anyhow::Result<Arc<dyn BlobStore>> {
        let storage = &self.config.storage;
        let store = blindscore_storage::S3BlobStore::minio(
            storage.s3_endpoint.clone(),
            storage.s3_bucket.clone(),
        );
        store.ensure_bucket(&self.config.exchange.bucket).await?;
        tracing::debug!(endpoint = %storage.s3_endpoint, "using s3 store");
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "s3"))]
    async fn s3_store(&self) -> anyhow::Result<Arc<dyn BlobStore>> {
        anyhow::bail!("S3 storage requires building with --features s3")
    }
}
