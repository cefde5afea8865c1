//! Decryption

use tfhe::core_crypto::prelude::*;

use crate::ciphertext::Ciphertext;
use crate::context::SecretContext;
use crate::encoding::decode_real;
use crate::error::{RlweError, RlweResult};
use crate::glwe;

/// Decrypt the logical slots of `ct`
///
/// Fails with [`RlweError::ContextMismatch`] unless `ct` was produced under
/// the public half of `ctx`; a foreign key would otherwise yield noise that
/// looks like a plausible value.
pub fn decrypt(ctx: &SecretContext, ct: &Ciphertext) -> RlweResult<Vec<f64>> {
    if ct.context_id() != ctx.id() || ct.degree() != ctx.params().poly_degree {
        return Err(RlweError::ContextMismatch);
    }

    let mut plaintext = PlaintextList::new(0u128, PlaintextCount(ct.degree()));
    decrypt_glwe_ciphertext(ctx.secret_key().inner(), &ct.glwe, &mut plaintext);

    let coeffs = plaintext.as_ref();
    Ok(ct
        .layout
        .window()
        .map(|k| decode_real(glwe::center(coeffs[k], ct.modulus_bits), ct.scale_bits))
        .collect())
}
