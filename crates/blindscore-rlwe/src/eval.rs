//! Homomorphic evaluation
//!
//! None of these operations need key material. Plaintext operands are encoded
//! at the ciphertext's `plain_scale_bits`, so every multiplication raises the
//! ciphertext scale by that many bits; [`rescale`] divides it back out and
//! moves the ciphertext one level down the modulus chain. Additions require
//! equal scales.

use tfhe::core_crypto::algorithms::polynomial_algorithms::polynomial_wrapping_mul;
use tfhe::core_crypto::algorithms::slice_algorithms::slice_wrapping_scalar_mul_assign;
use tfhe::core_crypto::prelude::*;

use crate::ciphertext::{Ciphertext, SlotLayout};
use crate::encoding::{encode_real, pow2};
use crate::error::{RlweError, RlweResult};
use crate::glwe;
use crate::params::MIN_SCALE_BITS;

/// Slot-wise sum of two ciphertexts
///
/// Operands on different levels meet at the lower modulus: a ciphertext
/// modulo `2^k` is also one modulo any `2^j` with `j < k`.
pub fn add(lhs: &Ciphertext, rhs: &Ciphertext) -> RlweResult<Ciphertext> {
    if lhs.context_id != rhs.context_id {
        return Err(RlweError::ContextMismatch);
    }
    if lhs.scale_bits != rhs.scale_bits {
        return Err(RlweError::ScaleMismatch {
            left: lhs.scale_bits,
            right: rhs.scale_bits,
        });
    }
    if lhs.layout.window() != rhs.layout.window() {
        return Err(RlweError::LayoutMismatch(format!(
            "slots {:?} vs {:?}",
            lhs.layout.window(),
            rhs.layout.window()
        )));
    }

    let mut out = lhs.clone();
    glwe_ciphertext_add_assign(&mut out.glwe, &rhs.glwe);
    out.modulus_bits = lhs.modulus_bits.min(rhs.modulus_bits);
    out.layout.clean = lhs.layout.clean && rhs.layout.clean;
    out.message_bound = lhs.message_bound + rhs.message_bound;
    out.noise_bound = lhs.noise_bound + rhs.noise_bound;
    out.check_budget()
}

/// Add a plaintext constant to every slot
pub fn add_scalar(ct: &Ciphertext, value: f64) -> RlweResult<Ciphertext> {
    let encoded = encode_real(value, ct.scale_bits)?;

    let mut out = ct.clone();
    let (_, mut body) = glwe::split_mut(&mut out.glwe);
    let body = body.as_mut();
    for k in ct.layout.window() {
        body[k] = body[k].wrapping_add(encoded as u128);
    }
    out.message_bound += encoded.unsigned_abs() as f64;
    out.check_budget()
}

/// Multiply every slot by a plaintext constant
///
/// The result is at scale `2^(scale_bits + plain_scale_bits)`; follow with
/// [`rescale`] before mixing it with ciphertexts at the original scale.
pub fn mul_scalar(ct: &Ciphertext, value: f64) -> RlweResult<Ciphertext> {
    let encoded = encode_real(value, ct.plain_scale_bits)?;
    let factor = encoded.unsigned_abs() as f64;

    let mut out = ct.clone();
    slice_wrapping_scalar_mul_assign(out.glwe.as_mut(), encoded as u128);
    out.scale_bits = ct.scale_bits + ct.plain_scale_bits;
    out.message_bound = ct.message_bound * factor;
    out.noise_bound = ct.noise_bound * factor;
    out.check_budget()
}

/// Inner product of the encrypted slots with plaintext `weights`
///
/// Multiplies by `sum_i w_i X^(len-1-i)`; coefficient `len-1` of the product
/// is `sum_i v_i w_i` and no wrap-around term reaches it. The result is a
/// single slot at offset `len-1`; the other coefficients hold unrelated
/// partial sums, so the output is no longer a clean packing.
pub fn dot(ct: &Ciphertext, weights: &[f64]) -> RlweResult<Ciphertext> {
    let layout = ct.layout;
    if layout.offset != 0 || !layout.clean {
        return Err(RlweError::LayoutMismatch(
            "dot product needs a freshly packed vector".into(),
        ));
    }
    if weights.len() != layout.len {
        return Err(RlweError::LengthMismatch {
            expected: layout.len,
            actual: weights.len(),
        });
    }

    let last = layout.len - 1;
    let mut terms = vec![0i128; ct.degree()];
    let mut weight_sum = 0.0;
    for (i, w) in weights.iter().enumerate() {
        let encoded = encode_real(*w, ct.plain_scale_bits)?;
        weight_sum += encoded.unsigned_abs() as f64;
        terms[last - i] = encoded;
    }
    let weight_poly = glwe::from_signed(&terms);

    let mut out = ct.clone();
    {
        let (mask, body) = glwe::split(&ct.glwe);
        let (mut out_mask, mut out_body) = glwe::split_mut(&mut out.glwe);
        polynomial_wrapping_mul(&mut out_mask, &mask, &weight_poly);
        polynomial_wrapping_mul(&mut out_body, &body, &weight_poly);
    }
    out.scale_bits = ct.scale_bits + ct.plain_scale_bits;
    out.layout = SlotLayout {
        offset: last,
        len: 1,
        clean: false,
    };
    out.message_bound = ct.message_bound * weight_sum;
    out.noise_bound = ct.noise_bound * weight_sum;
    out.check_budget()
}

/// Divide out the plaintext scale picked up by the last multiplication
///
/// Switches the ciphertext modulus from `2^k` to `2^(k - plain_scale_bits)`,
/// returning the slots to the scale they had before the multiplication.
/// Rounding adds a small amount of noise that depends only on the ring
/// degree.
pub fn rescale(ct: &Ciphertext) -> RlweResult<Ciphertext> {
    let shift = ct.plain_scale_bits;
    if ct.scale_bits < shift + MIN_SCALE_BITS {
        return Err(RlweError::OutOfRange(format!(
            "scale 2^{} cannot drop another 2^{shift}",
            ct.scale_bits
        )));
    }
    if ct.modulus_bits <= shift {
        return Err(RlweError::PrecisionExhausted(format!(
            "modulus 2^{} has no level left to drop",
            ct.modulus_bits
        )));
    }

    let mut out = ct.clone();
    glwe::rescale(&mut out.glwe, ct.modulus_bits, shift);
    out.modulus_bits = ct.modulus_bits - shift;
    out.scale_bits = ct.scale_bits - shift;
    out.message_bound = ct.message_bound / pow2(shift);
    out.noise_bound = ct.noise_bound / pow2(shift) + rescale_noise_bound(ct.degree());
    out.check_budget()
}

/// High-probability bound on the rounding error `r0 - r1*s` of a rescale
///
/// Each rounding error is uniform on `[-1/2, 1/2]` (variance 1/12) and the
/// binary secret has about `n/2` nonzero coefficients.
fn rescale_noise_bound(n: usize) -> f64 {
    6.0 * (n as f64 / 24.0).sqrt() + 0.5
}

/// Sum of several single-layout ciphertexts
pub fn sum<'a>(cts: impl IntoIterator<Item = &'a Ciphertext>) -> RlweResult<Ciphertext> {
    let mut iter = cts.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| RlweError::OutOfRange("cannot sum zero ciphertexts".into()))?;
    iter.try_fold(first.clone(), |acc, ct| add(&acc, ct))
}

/// Current scale of `ct` as a real factor
pub fn scale_of(ct: &Ciphertext) -> f64 {
    pow2(ct.scale_bits)
}
