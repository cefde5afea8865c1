//! Mock HE backend for testing
//!
//! NOT SECURE - ciphertexts carry their values in the clear.
//! Mirrors the RLWE backend's bookkeeping (context binding, input limit,
//! scale growth and rescaling, slot layout) so protocol code hits the same
//! error paths without the polynomial arithmetic.

use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use blindscore_rlwe::RlweParams;
use blindscore_rlwe::params::MIN_SCALE_BITS;

use crate::context::ContextParams;
use crate::error::{HeError, HeResult};
use crate::he::{BackendId, HeBackend};

#[derive(Debug, Clone, Copy, Default)]
pub struct MockBackend;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockPublicContext {
    id: [u8; 32],
    slot_capacity: usize,
    scale_bits: u32,
    plain_scale_bits: u32,
    value_bits: u32,
}

#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct MockFullContext {
    #[zeroize(skip)]
    public: MockPublicContext,
    secret: [u8; 32],
}

impl std::fmt::Debug for MockFullContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFullContext")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockCiphertext {
    context_id: [u8; 32],
    scale_bits: u32,
    plain_scale_bits: u32,
    /// False once a dot product has collapsed the vector to one slot
    packed: bool,
    values: Vec<f64>,
}

fn context_id_for(secret: &[u8; 32]) -> [u8; 32] {
    blake3::derive_key("blindscore mock context v1", secret)
}

fn check_finite(ct: MockCiphertext) -> HeResult<MockCiphertext> {
    if ct.values.iter().all(|v| v.is_finite()) {
        Ok(ct)
    } else {
        Err(HeError::Evaluation("value overflowed".into()))
    }
}

impl HeBackend for MockBackend {
    type FullContext = MockFullContext;
    type PublicContext = MockPublicContext;
    type Ciphertext = MockCiphertext;

    fn backend_id(&self) -> BackendId {
        BackendId::Mock
    }

    fn name(&self) -> &'static str {
        "Mock (TESTING ONLY)"
    }

    fn is_secure(&self) -> bool {
        false
    }

    fn generate_context(&self, params: &ContextParams) -> HeResult<Self::FullContext> {
        RlweParams::from(params)
            .validate()
            .map_err(|e| HeError::InvalidContext(e.to_string()))?;

        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);

        Ok(MockFullContext {
            public: MockPublicContext {
                id: context_id_for(&secret),
                slot_capacity: params.poly_degree,
                scale_bits: params.scale_bits,
                plain_scale_bits: params.plain_scale_bits,
                value_bits: params.value_bits,
            },
            secret,
        })
    }

    fn derive_public(&self, full: &Self::FullContext) -> Self::PublicContext {
        full.public.clone()
    }

    fn context_id(&self, public: &Self::PublicContext) -> [u8; 32] {
        public.id
    }

    fn ciphertext_context_id(&self, ct: &Self::Ciphertext) -> [u8; 32] {
        ct.context_id
    }

    fn slot_capacity(&self, public: &Self::PublicContext) -> usize {
        public.slot_capacity
    }

    fn encrypt(&self, public: &Self::PublicContext, values: &[f64]) -> HeResult<Self::Ciphertext> {
        if values.is_empty() {
            return Err(HeError::Encryption("empty vector".into()));
        }
        if values.len() > public.slot_capacity {
            return Err(HeError::Encryption(format!(
                "{} values exceed {} slots",
                values.len(),
                public.slot_capacity
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(HeError::Encryption("non-finite value".into()));
        }
        let limit = 2f64.powi(public.value_bits as i32);
        if let Some(v) = values.iter().find(|v| v.abs() > limit) {
            return Err(HeError::Encryption(format!(
                "{v} exceeds the context limit 2^{}",
                public.value_bits
            )));
        }

        Ok(MockCiphertext {
            context_id: public.id,
            scale_bits: public.scale_bits,
            plain_scale_bits: public.plain_scale_bits,
            packed: true,
            values: values.to_vec(),
        })
    }

    fn decrypt(&self, full: &Self::FullContext, ct: &Self::Ciphertext) -> HeResult<Vec<f64>> {
        if ct.context_id != context_id_for(&full.secret) {
            return Err(HeError::ContextMismatch);
        }
        Ok(ct.values.clone())
    }

    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> HeResult<Self::Ciphertext> {
        if lhs.context_id != rhs.context_id {
            return Err(HeError::ContextMismatch);
        }
        if lhs.scale_bits != rhs.scale_bits {
            return Err(HeError::ScaleMismatch {
                left: lhs.scale_bits,
                right: rhs.scale_bits,
            });
        }
        if lhs.values.len() != rhs.values.len() {
            return Err(HeError::Evaluation(format!(
                "slot count {} vs {}",
                lhs.values.len(),
                rhs.values.len()
            )));
        }

        let mut out = lhs.clone();
        out.packed = lhs.packed && rhs.packed;
        for (a, b) in out.values.iter_mut().zip(&rhs.values) {
            *a += b;
        }
        check_finite(out)
    }

    fn add_plain(&self, ct: &Self::Ciphertext, value: f64) -> HeResult<Self::Ciphertext> {
        let mut out = ct.clone();
        out.values.iter_mut().for_each(|v| *v += value);
        check_finite(out)
    }

    fn mul_plain(&self, ct: &Self::Ciphertext, value: f64) -> HeResult<Self::Ciphertext> {
        let mut out = ct.clone();
        out.values.iter_mut().for_each(|v| *v *= value);
        out.scale_bits += ct.plain_scale_bits;
        check_finite(out)
    }

    fn dot_plain(&self, ct: &Self::Ciphertext, weights: &[f64]) -> HeResult<Self::Ciphertext> {
        if !ct.packed {
            return Err(HeError::Evaluation(
                "dot product needs a freshly packed vector".into(),
            ));
        }
        if weights.len() != ct.values.len() {
            return Err(HeError::Evaluation(format!(
                "expected {} weights, got {}",
                ct.values.len(),
                weights.len()
            )));
        }

        let dot = ct.values.iter().zip(weights).map(|(v, w)| v * w).sum();
        check_finite(MockCiphertext {
            context_id: ct.context_id,
            scale_bits: ct.scale_bits + ct.plain_scale_bits,
            plain_scale_bits: ct.plain_scale_bits,
            packed: false,
            values: vec![dot],
        })
    }

    fn rescale(&self, ct: &Self::Ciphertext) -> HeResult<Self::Ciphertext> {
        if ct.scale_bits < ct.plain_scale_bits + MIN_SCALE_BITS {
            return Err(HeError::Evaluation(format!(
                "scale 2^{} cannot drop another 2^{}",
                ct.scale_bits, ct.plain_scale_bits
            )));
        }
        let mut out = ct.clone();
        out.scale_bits -= ct.plain_scale_bits;
        Ok(out)
    }

    fn slot_count(&self, ct: &Self::Ciphertext) -> usize {
        ct.values.len()
    }

    fn serialize_public(&self, public: &Self::PublicContext) -> Vec<u8> {
        serde_json::to_vec(public).unwrap_or_default()
    }

    fn serialize_full(&self, full: &Self::FullContext) -> Vec<u8> {
        serde_json::to_vec(full).unwrap_or_default()
    }

    fn deserialize_public(&self, bytes: &[u8]) -> HeResult<Self::PublicContext> {
        serde_json::from_slice(bytes).map_err(|e| HeError::InvalidContext(e.to_string()))
    }

    fn deserialize_full(&self, bytes: &[u8]) -> HeResult<Self::FullContext> {
        let full: MockFullContext =
            serde_json::from_slice(bytes).map_err(|e| HeError::InvalidContext(e.to_string()))?;
        if context_id_for(&full.secret) != full.public.id {
            return Err(HeError::InvalidContext(
                "secret does not match context id".into(),
            ));
        }
        Ok(full)
    }

    fn serialize_ciphertext(&self, ct: &Self::Ciphertext) -> Vec<u8> {
        serde_json::to_vec(ct).unwrap_or_default()
    }

    fn deserialize_ciphertext(&self, bytes: &[u8]) -> HeResult<Self::Ciphertext> {
        let ct: MockCiphertext = serde_json::from_slice(bytes)
            .map_err(|e| HeError::InvalidCiphertext(e.to_string()))?;
        if ct.values.is_empty() {
            return Err(HeError::InvalidCiphertext("no slots".into()));
        }
        Ok(ct)
    }
}
