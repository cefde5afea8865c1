//! Context lifecycle: generation, public derivation and framed serialization
//!
//! Serialized contexts are framed as
//!
//! ```text
//! [backend_id: 1][kind: 1][backend-native bytes]
//! ```
//!
//! where `kind` is 0 for a public context and 1 for a full one. A full
//! context serialized without its secret produces exactly the public framing.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{CoreResult, HeError};
use crate::he::{BackendId, HeBackend};

const KIND_PUBLIC: u8 = 0;
const KIND_FULL: u8 = 1;

/// Encryption parameters chosen by the Data Owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextParams {
    /// Ring dimension, a power of two; also the slot capacity
    pub poly_degree: usize,
    /// Fixed-point scale 2^scale_bits for encoded values
    pub scale_bits: u32,
    /// Scale weights are encoded at; each multiplication is rescaled by it
    pub plain_scale_bits: u32,
    /// Public bound on input magnitudes, 2^value_bits
    pub value_bits: u32,
    pub noise_std: f64,
}

impl Default for ContextParams {
    fn default() -> Self {
        Self {
            poly_degree: 8192,
            scale_bits: 30,
            plain_scale_bits: 30,
            value_bits: 24,
            noise_std: 3.2,
        }
    }
}

impl ContextParams {
    /// Small ring for fast tests; not secure
    pub fn insecure_testing() -> Self {
        Self {
            poly_degree: 1024,
            ..Self::default()
        }
    }
}

/// A context as read back from storage
pub enum Context<B: HeBackend> {
    Full(B::FullContext),
    Public(B::PublicContext),
}

impl<B: HeBackend> Clone for Context<B> {
    fn clone(&self) -> Self {
        match self {
            Context::Full(full) => Context::Full(full.clone()),
            Context::Public(public) => Context::Public(public.clone()),
        }
    }
}

impl<B: HeBackend> std::fmt::Debug for Context<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Context::Full(_) => f.write_str("Context::Full(..)"),
            Context::Public(_) => f.write_str("Context::Public(..)"),
        }
    }
}

impl<B: HeBackend> Context<B> {
    pub fn is_full(&self) -> bool {
        matches!(self, Context::Full(_))
    }

    /// Fails with `InvalidContext` for a public context
    pub fn into_full(self) -> CoreResult<B::FullContext> {
        match self {
            Context::Full(full) => Ok(full),
            Context::Public(_) => {
                Err(HeError::InvalidContext("context has no secret key".into()).into())
            }
        }
    }

    /// Public half, stripping the secret if present
    pub fn to_public(&self, backend: &B) -> B::PublicContext {
        match self {
            Context::Full(full) => backend.derive_public(full),
            Context::Public(public) => public.clone(),
        }
    }
}

pub struct ContextManager<B: HeBackend> {
    backend: B,
}

impl<B: HeBackend> ContextManager<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn generate_context(&self, params: &ContextParams) -> CoreResult<B::FullContext> {
        tracing::debug!(
            backend = %self.backend.backend_id(),
            poly_degree = params.poly_degree,
            scale_bits = params.scale_bits,
            "generating context"
        );
        if !self.backend.is_secure() {
            tracing::warn!(backend = self.backend.name(), "backend does not hide values");
        }
        Ok(self.backend.generate_context(params)?)
    }

    pub fn derive_public(&self, full: &B::FullContext) -> B::PublicContext {
        self.backend.derive_public(full)
    }

    pub fn serialize_public(&self, public: &B::PublicContext) -> Vec<u8> {
        self.frame(KIND_PUBLIC, self.backend.serialize_public(public))
    }

    /// Serialize a full context; without `include_secret` only its public
    /// half is written
    pub fn serialize_full(&self, full: &B::FullContext, include_secret: bool) -> Vec<u8> {
        if include_secret {
            self.frame(KIND_FULL, self.backend.serialize_full(full))
        } else {
            self.serialize_public(&self.backend.derive_public(full))
        }
    }

    pub fn serialize(&self, ctx: &Context<B>, include_secret: bool) -> Vec<u8> {
        match ctx {
            Context::Full(full) => self.serialize_full(full, include_secret),
            Context::Public(public) => self.serialize_public(public),
        }
    }

    /// Parse framed context bytes, keeping the secret if one is present
    pub fn deserialize(&self, bytes: &[u8]) -> CoreResult<Context<B>> {
        let [tag, kind, payload @ ..] = bytes else {
            return Err(HeError::InvalidContext("context too short".into()).into());
        };

        let backend_id = BackendId::try_from(*tag)?;
        if backend_id != self.backend.backend_id() {
            return Err(HeError::InvalidContext(format!(
                "context belongs to backend {backend_id}, expected {}",
                self.backend.backend_id()
            ))
            .into());
        }

        match *kind {
            KIND_PUBLIC => Ok(Context::Public(self.backend.deserialize_public(payload)?)),
            KIND_FULL => Ok(Context::Full(self.backend.deserialize_full(payload)?)),
            other => Err(HeError::InvalidContext(format!("unknown context kind {other}")).into()),
        }
    }

    pub fn to_text(&self, ctx: &Context<B>, include_secret: bool) -> String {
        codec::encode(&self.serialize(ctx, include_secret))
    }

    pub fn from_text(&self, text: &str) -> CoreResult<Context<B>> {
        self.deserialize(&codec::decode(text)?)
    }

    fn frame(&self, kind: u8, payload: Vec<u8>) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(payload.len() + 2);
        bytes.push(self.backend.backend_id() as u8);
        bytes.push(kind);
        bytes.extend(payload);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::he::backends::{MockBackend, RlweBackend};

    #[test]
    fn test_params_defaults() {
        let params = ContextParams::default();
        assert_eq!(params.poly_degree, 8192);
        assert_eq!(params.scale_bits, 30);
    }

    #[test]
    fn test_params_partial_deserialize() {
        let params: ContextParams = serde_json::from_str(r#"{"poly_degree": 2048}"#).unwrap();
        assert_eq!(params.poly_degree, 2048);
        assert_eq!(params.value_bits, 24);
    }

    #[test]
    fn test_public_without_secret_equals_public_bytes() {
        let manager = ContextManager::new(RlweBackend);
        let full = manager
            .generate_context(&ContextParams::insecure_testing())
            .unwrap();
        let public = manager.derive_public(&full);

        assert_eq!(
            manager.serialize_full(&full, false),
            manager.serialize_public(&public)
        );
    }

    #[test]
    fn test_full_roundtrip_keeps_secret() {
        let manager = ContextManager::new(MockBackend);
        let full = manager
            .generate_context(&ContextParams::insecure_testing())
            .unwrap();

        let text = manager.to_text(&Context::Full(full), true);
        let parsed = manager.from_text(&text).unwrap();
        assert!(parsed.is_full());
        assert!(parsed.into_full().is_ok());
    }

    #[test]
    fn test_public_into_full_fails() {
        let manager = ContextManager::new(MockBackend);
        let full = manager
            .generate_context(&ContextParams::insecure_testing())
            .unwrap();

        let bytes = manager.serialize_full(&full, false);
        let parsed = manager.deserialize(&bytes).unwrap();
        assert!(!parsed.is_full());
        assert!(matches!(
            parsed.into_full(),
            Err(CoreError::He(HeError::InvalidContext(_)))
        ));
    }

    #[test]
    fn test_backend_tag_mismatch() {
        let mock = ContextManager::new(MockBackend);
        let rlwe = ContextManager::new(RlweBackend);
        let full = mock
            .generate_context(&ContextParams::insecure_testing())
            .unwrap();

        let bytes = mock.serialize_full(&full, true);
        assert!(matches!(
            rlwe.deserialize(&bytes),
            Err(CoreError::He(HeError::InvalidContext(_)))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let manager = ContextManager::new(RlweBackend);
        assert!(manager.deserialize(&[]).is_err());
        assert!(manager.deserialize(&[0]).is_err());
        assert!(manager.deserialize(&[0, 9, 1, 2, 3]).is_err());
        assert!(manager.deserialize(&[0, 0, 1, 2, 3]).is_err());
        assert!(matches!(
            manager.from_text("not base64!"),
            Err(CoreError::MalformedEncoding(_))
        ));
    }
}
