//! The shared namespace both parties read and write
//!
//! Objects are codec text stored as UTF-8 bytes under fixed names, optionally
//! behind a configured key prefix.

use std::sync::Arc;

use blindscore_storage::BlobStore;

use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, ExchangeResult};

/// Encrypted input vector, written by the Owner
pub const ENCRYPTED_INPUT: &str = "inputs/encrypted_transactions";
/// Public context, written by the Owner
pub const PUBLIC_CONTEXT: &str = "keys/public";
/// Encrypted score, written by the Compute Party
pub const ENCRYPTED_SCORE: &str = "outputs/encrypted_score";

#[derive(Clone)]
pub struct Mailbox {
    store: Arc<dyn BlobStore>,
    bucket: String,
    prefix: String,
}

impl Mailbox {
    pub fn new(store: Arc<dyn BlobStore>, config: &ExchangeConfig) -> Self {
        Self {
            store,
            bucket: config.bucket.clone(),
            prefix: config.key_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Full storage key for an exchange object
    pub fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.prefix)
        }
    }

    pub async fn put_text(&self, name: &str, text: &str) -> ExchangeResult<()> {
        let key = self.key(name);
        self.store.put(&self.bucket, &key, text.as_bytes()).await?;
        tracing::debug!(bucket = %self.bucket, %key, "published object");
        Ok(())
    }

    /// Fetch an object that must exist
    pub async fn get_text(&self, name: &str) -> ExchangeResult<String> {
        self.try_get_text(name)
            .await?
            .ok_or_else(|| ExchangeError::ObjectNotFound {
                bucket: self.bucket.clone(),
                key: self.key(name),
            })
    }

    /// Fetch an object, treating absence as `None`
    ///
    /// Any storage failure other than absence is returned as an error.
    pub async fn try_get_text(&self, name: &str) -> ExchangeResult<Option<String>> {
        match self.store.get(&self.bucket, &self.key(name)).await {
            // Invalid UTF-8 cannot be codec text; the replacement characters
            // fail decoding downstream.
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, name: &str) -> ExchangeResult<bool> {
        Ok(self.store.exists(&self.bucket, &self.key(name)).await?)
    }
}
