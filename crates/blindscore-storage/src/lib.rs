//! blindscore-storage: Bucket/key blob storage
//!
//! The two parties of an exchange never talk directly; they leave objects for
//! each other in a shared store. This crate provides that store behind the
//! async [`BlobStore`] trait. It knows nothing about what the objects contain.
//!
//! ## Backends
//!
//! | Backend             | Use Case              | Feature Flag |
//! |---------------------|-----------------------|--------------|
//! | `InMemoryBlobStore` | Unit tests            | (always)     |
//! | `LocalBlobStore`    | Single host, CLI      | (always)     |
//! | `S3BlobStore`       | Production (Minio/S3) | `s3`         |
//!
//! ## Example
//!
//! ```rust
//! use blindscore_storage::{BlobStore, InMemoryBlobStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryBlobStore::new();
//!
//!     store.put("alice_data", "keys/public", b"context").await?;
//!     let retrieved = store.get("alice_data", "keys/public").await?;
//!     assert_eq!(retrieved, b"context");
//!
//!     Ok(())
//! }
//! ```

mod error;
mod traits;

mod local;
mod memory;

#[cfg(feature = "s3")]
mod s3;

// Re-exports
pub use error::{StorageError, StorageResult};
pub use traits::{BlobStore, validate_bucket, validate_key};

pub use local::LocalBlobStore;
pub use memory::InMemoryBlobStore;

#[cfg(feature = "s3")]
pub use s3::S3BlobStore;
