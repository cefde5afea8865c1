//! Public-key encryption
//!
//! With the public key `(a, b = a*s + e)` a message polynomial `m` encrypts
//! to the GLWE ciphertext `(a*u + e1, b*u + e2 + m)` for a fresh binary `u`.
//! Decrypting it with tfhe yields `m + e*u + e2 - e1*s`.

use tfhe::core_crypto::algorithms::polynomial_algorithms::{
    polynomial_wrapping_add_assign, polynomial_wrapping_add_mul_assign,
};

use crate::ciphertext::{Ciphertext, SlotLayout};
use crate::context::PublicContext;
use crate::encoding::{encode_real, pow2};
use crate::error::{RlweError, RlweResult};
use crate::glwe;
use crate::params::MODULUS_BITS;
use crate::sampling;

/// Encrypt `values` into the first `values.len()` coefficients
///
/// Only public material is needed. Each call uses fresh randomness, so two
/// encryptions of the same vector never share bytes. Values must lie within
/// the context's public limit `2^value_bits`.
pub fn encrypt(ctx: &PublicContext, values: &[f64]) -> RlweResult<Ciphertext> {
    let params = ctx.params();
    let n = params.poly_degree;

    if values.is_empty() {
        return Err(RlweError::OutOfRange("cannot encrypt an empty vector".into()));
    }
    if values.len() > n {
        return Err(RlweError::LengthMismatch {
            expected: n,
            actual: values.len(),
        });
    }
    if let Some(v) = values.iter().find(|v| v.abs() > params.value_limit()) {
        return Err(RlweError::OutOfRange(format!(
            "{v} exceeds the context limit 2^{}",
            params.value_bits
        )));
    }

    let mut message = vec![0i128; n];
    for (slot, value) in message.iter_mut().zip(values) {
        *slot = encode_real(*value, params.scale_bits)?;
    }
    let message = glwe::from_signed(&message);

    let mut rng = sampling::os_seeded_rng();
    let u = sampling::binary(n);
    let e1 = sampling::gaussian(n, params.noise_std, &mut rng)?;
    let e2 = sampling::gaussian(n, params.noise_std, &mut rng)?;

    let (a, b) = ctx.public_key().polynomials();
    let mut out = glwe::zero(n);
    let (mut mask, mut body) = glwe::split_mut(&mut out);

    polynomial_wrapping_add_mul_assign(&mut mask, &a, &u);
    polynomial_wrapping_add_assign(&mut mask, &e1);

    polynomial_wrapping_add_mul_assign(&mut body, &b, &u);
    polynomial_wrapping_add_assign(&mut body, &e2);
    polynomial_wrapping_add_assign(&mut body, &message);

    Ciphertext {
        context_id: *ctx.id(),
        glwe: out,
        modulus_bits: MODULUS_BITS,
        scale_bits: params.scale_bits,
        plain_scale_bits: params.plain_scale_bits,
        layout: SlotLayout::packed(values.len()),
        message_bound: pow2(params.value_bits + params.scale_bits),
        noise_bound: fresh_noise_bound(n, params.noise_std),
    }
    .check_budget()
}

/// High-probability bound on `e*u + e2 - e1*s` for a fresh ciphertext
///
/// Six standard deviations of each Gaussian term; the binary `u` and `s`
/// have about `n/2` nonzero coefficients each.
fn fresh_noise_bound(n: usize, std_dev: f64) -> f64 {
    6.0 * std_dev * (2.0 * (n as f64 / 2.0).sqrt() + 1.0)
}
