//! Coefficient-packed RLWE for approximate real arithmetic
//!
//! This crate provides the homomorphic primitive behind blindscore: a
//! leveled public-key RLWE scheme over `Z_q[X]/(X^n + 1)`, encoding real
//! numbers at a fixed global scale (CKKS-style approximate arithmetic). Key
//! generation, GLWE encryption of the public key, decryption and all ring
//! arithmetic come from `tfhe::core_crypto`; this crate adds the encoding,
//! the public-key encryption that combines tfhe polynomials, and the level
//! bookkeeping.
//!
//! # Overview
//!
//! 1. **Encoding**: each real `v_i` becomes the coefficient `round(v_i * 2^scale_bits)`
//!    of the plaintext polynomial (coefficient packing, no canonical embedding)
//! 2. **Encryption**: `(a*u + e1, b*u + e2 + m)` under the public key
//!    `(a, b = a*s + e)`, itself a tfhe GLWE encryption of zero
//! 3. **Evaluation**: ciphertext addition, plaintext scalar add/multiply, and
//!    plaintext dot products realized as a polynomial product whose result
//!    lands in a single coefficient
//! 4. **Rescale**: after a multiplication the ciphertext modulus drops from
//!    `2^k` to `2^(k - plain_scale_bits)` and the slot scale returns to
//!    `2^scale_bits`
//! 5. **Decryption**: tfhe GLWE decryption, centered lift modulo the current
//!    `2^k`, divide by the current scale
//!
//! Every ciphertext carries message and noise bounds derived from public
//! quantities only (the context's input limit `2^value_bits`, the plaintext
//! operands and the parameters), and operations fail with
//! [`RlweError::PrecisionExhausted`] before anything could wrap.
//!
//! Galois keys are not needed: the only slot reduction the scheme offers is
//! the dot product, which is a plaintext polynomial product.
//!
//! # Example
//!
//! ```
//! use blindscore_rlwe::{RlweParams, SecretContext, decrypt, encrypt, eval};
//!
//! # fn main() -> Result<(), blindscore_rlwe::RlweError> {
//! let ctx = SecretContext::generate(RlweParams::insecure_testing())?;
//!
//! let ct = encrypt(ctx.public(), &[1.0, 2.0, 3.0])?;
//! let dot = eval::rescale(&eval::dot(&ct, &[0.5, 0.25, 1.0])?)?;
//!
//! let out = decrypt(&ctx, &dot)?;
//! assert!((out[0] - 4.0).abs() < 1e-4);
//! # Ok(())
//! # }
//! ```
//!
//! # Limitations
//!
//! - A dot product is only defined on a freshly packed vector (slots start at
//!   coefficient 0 and nothing else is encrypted); its output is a single slot.
//! - No ciphertext-ciphertext multiplication (no relinearization keys).
//! - Depth is bounded by the modulus chain: see [`RlweParams::max_depth`].

pub mod ciphertext;
pub mod context;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod eval;
pub mod keys;
pub mod params;

mod encoding;
mod glwe;
mod sampling;
mod wire;

// Re-exports for convenience
pub use ciphertext::{Ciphertext, SlotLayout};
pub use context::{ContextId, ParsedContext, PublicContext, SecretContext, parse_context};
pub use decrypt::decrypt;
pub use encrypt::encrypt;
pub use error::{RlweError, RlweResult};
pub use keys::{PublicKey, SecretKey};
pub use params::RlweParams;
