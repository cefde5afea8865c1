//! RLWE backend built on `blindscore-rlwe`
//!
//! Values are packed into polynomial coefficients at a fixed-point scale, so
//! inner products with plaintext weights need no rotation keys. Each
//! multiplication is followed by a rescale one level down the modulus chain.

use blindscore_rlwe::{self as rlwe, RlweError, RlweParams};

use crate::context::ContextParams;
use crate::error::{HeError, HeResult};
use crate::he::{BackendId, HeBackend};

#[derive(Debug, Clone, Copy, Default)]
pub struct RlweBackend;

impl From<&ContextParams> for RlweParams {
    fn from(params: &ContextParams) -> Self {
        RlweParams {
            poly_degree: params.poly_degree,
            scale_bits: params.scale_bits,
            plain_scale_bits: params.plain_scale_bits,
            value_bits: params.value_bits,
            noise_std: params.noise_std,
        }
    }
}

/// Map scheme errors raised while evaluating
fn evaluation_error(err: RlweError) -> HeError {
    match err {
        RlweError::ContextMismatch => HeError::ContextMismatch,
        RlweError::ScaleMismatch { left, right } => HeError::ScaleMismatch { left, right },
        other => HeError::Evaluation(other.to_string()),
    }
}

impl HeBackend for RlweBackend {
    type FullContext = rlwe::SecretContext;
    type PublicContext = rlwe::PublicContext;
    type Ciphertext = rlwe::Ciphertext;

    fn backend_id(&self) -> BackendId {
        BackendId::Rlwe
    }

    fn name(&self) -> &'static str {
        "RLWE (coefficient packed)"
    }

    fn is_secure(&self) -> bool {
        true
    }

    fn generate_context(&self, params: &ContextParams) -> HeResult<Self::FullContext> {
        let params = RlweParams::from(params);
        params
            .validate()
            .map_err(|e| HeError::InvalidContext(e.to_string()))?;
        rlwe::SecretContext::generate(params).map_err(|e| HeError::KeyGeneration(e.to_string()))
    }

    fn derive_public(&self, full: &Self::FullContext) -> Self::PublicContext {
        full.public().clone()
    }

    fn context_id(&self, public: &Self::PublicContext) -> [u8; 32] {
        *public.id()
    }

    fn ciphertext_context_id(&self, ct: &Self::Ciphertext) -> [u8; 32] {
        *ct.context_id()
    }

    fn slot_capacity(&self, public: &Self::PublicContext) -> usize {
        public.slot_capacity()
    }

    fn encrypt(&self, public: &Self::PublicContext, values: &[f64]) -> HeResult<Self::Ciphertext> {
        rlwe::encrypt(public, values).map_err(|e| HeError::Encryption(e.to_string()))
    }

    fn decrypt(&self, full: &Self::FullContext, ct: &Self::Ciphertext) -> HeResult<Vec<f64>> {
        rlwe::decrypt(full, ct).map_err(|e| match e {
            RlweError::ContextMismatch => HeError::ContextMismatch,
            other => HeError::Decryption(other.to_string()),
        })
    }

    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> HeResult<Self::Ciphertext> {
        rlwe::eval::add(lhs, rhs).map_err(evaluation_error)
    }

    fn add_plain(&self, ct: &Self::Ciphertext, value: f64) -> HeResult<Self::Ciphertext> {
        rlwe::eval::add_scalar(ct, value).map_err(evaluation_error)
    }

    fn mul_plain(&self, ct: &Self::Ciphertext, value: f64) -> HeResult<Self::Ciphertext> {
        rlwe::eval::mul_scalar(ct, value).map_err(evaluation_error)
    }

    fn dot_plain(&self, ct: &Self::Ciphertext, weights: &[f64]) -> HeResult<Self::Ciphertext> {
        rlwe::eval::dot(ct, weights).map_err(evaluation_error)
    }

    fn rescale(&self, ct: &Self::Ciphertext) -> HeResult<Self::Ciphertext> {
        rlwe::eval::rescale(ct).map_err(evaluation_error)
    }

    fn slot_count(&self, ct: &Self::Ciphertext) -> usize {
        ct.slot_count()
    }

    fn serialize_public(&self, public: &Self::PublicContext) -> Vec<u8> {
        public.to_bytes()
    }

    fn serialize_full(&self, full: &Self::FullContext) -> Vec<u8> {
        full.to_bytes()
    }

    fn deserialize_public(&self, bytes: &[u8]) -> HeResult<Self::PublicContext> {
        rlwe::PublicContext::from_bytes(bytes).map_err(|e| HeError::InvalidContext(e.to_string()))
    }

    fn deserialize_full(&self, bytes: &[u8]) -> HeResult<Self::FullContext> {
        rlwe::SecretContext::from_bytes(bytes).map_err(|e| HeError::InvalidContext(e.to_string()))
    }

    fn serialize_ciphertext(&self, ct: &Self::Ciphertext) -> Vec<u8> {
        ct.to_bytes()
    }

    fn deserialize_ciphertext(&self, bytes: &[u8]) -> HeResult<Self::Ciphertext> {
        rlwe::Ciphertext::from_bytes(bytes).map_err(|e| HeError::InvalidCiphertext(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> (RlweBackend, rlwe::SecretContext) {
        let backend = RlweBackend;
        let full = backend
            .generate_context(&ContextParams::insecure_testing())
            .unwrap();
        (backend, full)
    }

    #[test]
    fn test_rlwe_encrypt_decrypt() {
        let (backend, full) = context();
        let public = backend.derive_public(&full);
        let ct = backend.encrypt(&public, &[1.5, -2.0, 300.25]).unwrap();

        assert_eq!(backend.slot_count(&ct), 3);
        let values = backend.decrypt(&full, &ct).unwrap();
        assert!((values[2] - 300.25).abs() < 1e-5);
    }

    #[test]
    fn test_rlwe_invalid_params_rejected() {
        let params = ContextParams {
            poly_degree: 1000,
            ..ContextParams::insecure_testing()
        };
        assert!(matches!(
            RlweBackend.generate_context(&params),
            Err(HeError::InvalidContext(_))
        ));
    }

    #[test]
    fn test_rlwe_scale_mismatch_surfaces() {
        let (backend, full) = context();
        let public = backend.derive_public(&full);
        let ct = backend.encrypt(&public, &[1.0]).unwrap();
        let scaled = backend.mul_plain(&ct, 2.0).unwrap();

        assert!(matches!(
            backend.add(&ct, &scaled),
            Err(HeError::ScaleMismatch { left: 30, right: 60 })
        ));
    }

    #[test]
    fn test_rlwe_rescale_returns_to_input_scale() {
        let (backend, full) = context();
        let public = backend.derive_public(&full);
        let ct = backend.encrypt(&public, &[4.0, 2.0]).unwrap();
        let dot = backend
            .rescale(&backend.dot_plain(&ct, &[0.5, 0.25]).unwrap())
            .unwrap();
        let bias = backend.add_plain(&dot, 1.0).unwrap();

        assert_eq!(dot.scale_bits(), 30);
        assert!((backend.decrypt(&full, &bias).unwrap()[0] - 3.5).abs() < 1e-4);
    }

    #[test]
    fn test_rlwe_input_over_limit_is_encryption_error() {
        let (backend, full) = context();
        let public = backend.derive_public(&full);
        assert!(matches!(
            backend.encrypt(&public, &[1.0, 3.0e7]),
            Err(HeError::Encryption(_))
        ));
    }

    #[test]
    fn test_rlwe_wrong_context_decrypt() {
        let (backend, alice) = context();
        let (_, mallory) = context();
        let ct = backend
            .encrypt(&backend.derive_public(&alice), &[9.0])
            .unwrap();

        assert!(matches!(
            backend.decrypt(&mallory, &ct),
            Err(HeError::ContextMismatch)
        ));
    }

    #[test]
    fn test_rlwe_public_bytes_are_not_full() {
        let (backend, full) = context();
        let public_bytes = backend.serialize_public(&backend.derive_public(&full));
        assert!(matches!(
            backend.deserialize_full(&public_bytes),
            Err(HeError::InvalidContext(_))
        ));
        assert!(backend.deserialize_public(&public_bytes).is_ok());
    }
}
