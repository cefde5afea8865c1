//! # blindscore-core: Encrypted Scoring Core
//!
//! Composes homomorphic primitives into the two-party scoring protocol's
//! building blocks. The Data Owner generates a context, encrypts a vector and
//! later decrypts a score; the Compute Party evaluates a fixed linear model on
//! the ciphertext without ever holding secret key material.
//!
//! ## Features
//!
//! - **Pluggable HE backends**: RLWE (coefficient-packed, approximate reals)
//!   or Mock (testing)
//! - **Context lifecycle**: full/public split, framed serialization, text codec
//! - **Scoring engine**: two-layer linear model evaluated under encryption
//! - **Risk banding**: clamp to `[0, 100]` and map to low/suspicious/high
//!
//! ## Example
//!
//! ```rust
//! use blindscore_core::he::backends::MockBackend;
//! use blindscore_core::{ContextManager, ContextParams, ScoringEngine, ScoringModel, VectorAdapter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let contexts = ContextManager::new(MockBackend);
//! let adapter = VectorAdapter::new(MockBackend);
//! let engine = ScoringEngine::new(MockBackend, ScoringModel::builtin())?;
//!
//! // Owner side
//! let full = contexts.generate_context(&ContextParams::insecure_testing())?;
//! let public = contexts.derive_public(&full);
//! let input = adapter.encrypt(&public, &[120.0, 35.0, 800.0, 12.0, 5.0, 64.0])?;
//!
//! // Compute side: public material only
//! let encrypted_score = engine.score(&input)?;
//!
//! // Owner side
//! let score = adapter.decrypt_score(&full, &encrypted_score)?;
//! assert!(score.value <= 100);
//! # Ok(())
//! # }
//! ```
//!
//! ## Backend choice
//!
//! `MockBackend` carries values in the clear and exists for tests only.
//! `RlweBackend` is the production backend.

pub mod adapter;
pub mod codec;
pub mod context;
pub mod error;
pub mod he;
pub mod risk;
pub mod scoring;

// Re-exports for convenience
pub use adapter::VectorAdapter;
pub use context::{Context, ContextManager, ContextParams};
pub use error::{CoreError, CoreResult, HeError, HeResult};
pub use he::{BackendId, HeBackend};
pub use risk::{RiskBand, RiskScore, clamp_and_band};
pub use scoring::{ScoringEngine, ScoringModel};
