use super::BackendId;
use crate::context::ContextParams;
use crate::error::HeResult;

/// A homomorphic encryption backend for approximate real vectors
///
/// Abstracts over the scheme that carries the Data Owner's vector. Contexts
/// come in two flavours: the full context holds the secret key and never
/// leaves the owner, the public context is safe to hand to the compute party.
/// All encryptions are randomized, so ciphertext bytes differ between runs.
pub trait HeBackend: Clone + Send + Sync {
    /// Context including secret key material
    type FullContext: Clone + Send + Sync;

    /// Context with evaluation and encryption material only
    type PublicContext: Clone + Send + Sync;

    type Ciphertext: Clone + Send + Sync;

    /// Backend identifier for serialization format detection
    fn backend_id(&self) -> BackendId;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Whether ciphertexts actually hide their values
    fn is_secure(&self) -> bool;

    /// Generate a fresh context with new key material
    fn generate_context(&self, params: &ContextParams) -> HeResult<Self::FullContext>;

    /// Strip the secret key
    fn derive_public(&self, full: &Self::FullContext) -> Self::PublicContext;

    /// Fingerprint shared by a full context and its public half
    fn context_id(&self, public: &Self::PublicContext) -> [u8; 32];

    /// Fingerprint of the context a ciphertext was produced under
    fn ciphertext_context_id(&self, ct: &Self::Ciphertext) -> [u8; 32];

    /// Maximum number of values a single ciphertext can carry
    fn slot_capacity(&self, public: &Self::PublicContext) -> usize;

    fn encrypt(&self, public: &Self::PublicContext, values: &[f64]) -> HeResult<Self::Ciphertext>;

    /// Fails with `ContextMismatch` if the ciphertext was produced under
    /// another context
    fn decrypt(&self, full: &Self::FullContext, ct: &Self::Ciphertext) -> HeResult<Vec<f64>>;

    /// Slot-wise sum; scales and slot layouts must agree
    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> HeResult<Self::Ciphertext>;

    /// Add a plaintext constant to every slot
    fn add_plain(&self, ct: &Self::Ciphertext, value: f64) -> HeResult<Self::Ciphertext>;

    /// Multiply every slot by a plaintext constant
    fn mul_plain(&self, ct: &Self::Ciphertext, value: f64) -> HeResult<Self::Ciphertext>;

    /// Inner product with a plaintext weight vector, yielding one slot
    ///
    /// The input must be a freshly packed vector of exactly `weights.len()`
    /// slots.
    fn dot_plain(&self, ct: &Self::Ciphertext, weights: &[f64]) -> HeResult<Self::Ciphertext>;

    /// Divide out the plaintext scale picked up by the last multiplication
    ///
    /// Brings a product back to the scale of the ciphertexts it will be
    /// added to; fails once the scheme has no level left to drop.
    fn rescale(&self, ct: &Self::Ciphertext) -> HeResult<Self::Ciphertext>;

    /// Number of meaningful slots in a ciphertext
    fn slot_count(&self, ct: &Self::Ciphertext) -> usize;

    fn serialize_public(&self, public: &Self::PublicContext) -> Vec<u8>;

    fn serialize_full(&self, full: &Self::FullContext) -> Vec<u8>;

    fn deserialize_public(&self, bytes: &[u8]) -> HeResult<Self::PublicContext>;

    fn deserialize_full(&self, bytes: &[u8]) -> HeResult<Self::FullContext>;

    fn serialize_ciphertext(&self, ct: &Self::Ciphertext) -> Vec<u8>;

    fn deserialize_ciphertext(&self, bytes: &[u8]) -> HeResult<Self::Ciphertext>;
}
