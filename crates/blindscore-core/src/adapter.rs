//! Vector encryption and ciphertext framing
//!
//! Serialized ciphertexts are prefixed with the producing backend's id byte so
//! a blob from another backend is rejected before parsing.

use crate::codec;
use crate::error::{CoreResult, HeError};
use crate::he::{BackendId, HeBackend};
use crate::risk::{RiskScore, clamp_and_band};

pub struct VectorAdapter<B: HeBackend> {
    backend: B,
}

impl<B: HeBackend> VectorAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn encrypt(&self, public: &B::PublicContext, values: &[f64]) -> CoreResult<B::Ciphertext> {
        tracing::debug!(slots = values.len(), "encrypting vector");
        Ok(self.backend.encrypt(public, values)?)
    }

    /// Encrypt under the public half of a full context
    pub fn encrypt_with_full(
        &self,
        full: &B::FullContext,
        values: &[f64],
    ) -> CoreResult<B::Ciphertext> {
        self.encrypt(&self.backend.derive_public(full), values)
    }

    pub fn decrypt(&self, full: &B::FullContext, ct: &B::Ciphertext) -> CoreResult<Vec<f64>> {
        Ok(self.backend.decrypt(full, ct)?)
    }

    /// Decrypt a one-slot score and map it to a risk band
    pub fn decrypt_score(&self, full: &B::FullContext, ct: &B::Ciphertext) -> CoreResult<RiskScore> {
        let values = self.decrypt(full, ct)?;
        let raw = values
            .first()
            .copied()
            .ok_or_else(|| HeError::Decryption("score ciphertext has no slots".into()))?;
        Ok(clamp_and_band(raw))
    }

    /// Fails with `ContextMismatch` unless `ct` was encrypted under `public`
    pub fn check_context(&self, public: &B::PublicContext, ct: &B::Ciphertext) -> CoreResult<()> {
        if self.backend.ciphertext_context_id(ct) != self.backend.context_id(public) {
            return Err(HeError::ContextMismatch.into());
        }
        Ok(())
    }

    pub fn serialize_vector(&self, ct: &B::Ciphertext) -> Vec<u8> {
        let payload = self.backend.serialize_ciphertext(ct);
        let mut bytes = Vec::with_capacity(payload.len() + 1);
        bytes.push(self.backend.backend_id() as u8);
        bytes.extend(payload);
        bytes
    }

    pub fn deserialize_vector(&self, bytes: &[u8]) -> CoreResult<B::Ciphertext> {
        let [tag, payload @ ..] = bytes else {
            return Err(HeError::InvalidCiphertext("empty ciphertext".into()).into());
        };

        let expected = self.backend.backend_id();
        match BackendId::try_from(*tag) {
            Ok(id) if id == expected => Ok(self.backend.deserialize_ciphertext(payload)?),
            Ok(id) => Err(HeError::InvalidCiphertext(format!(
                "ciphertext belongs to backend {id}, expected {expected}"
            ))
            .into()),
            Err(_) => {
                Err(HeError::InvalidCiphertext(format!("unknown backend tag {tag}")).into())
            }
        }
    }

    pub fn to_text(&self, ct: &B::Ciphertext) -> String {
        codec::encode(&self.serialize_vector(ct))
    }

    pub fn from_text(&self, text: &str) -> CoreResult<B::Ciphertext> {
        self.deserialize_vector(&codec::decode(text)?)
    }
}
