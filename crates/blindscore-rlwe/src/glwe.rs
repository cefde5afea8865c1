//! Dimension-one GLWE ciphertexts over the native `u128` modulus
//!
//! tfhe stores a GLWE ciphertext as its mask polynomials followed by the
//! body; with `GlweDimension(1)` that is one mask polynomial and one body.
//! Helpers here cover the level bookkeeping tfhe has no notion of: a
//! ciphertext at level `bits` is only meaningful modulo `2^bits`.

use tfhe::core_crypto::prelude::*;

use crate::error::RlweResult;
use crate::wire::ByteReader;

pub(crate) type Glwe = GlweCiphertextOwned<u128>;

pub(crate) const GLWE_SIZE: GlweSize = GlweSize(2);

/// A zero ciphertext (trivially encrypting zero) of `degree` coefficients
pub(crate) fn zero(degree: usize) -> Glwe {
    GlweCiphertext::new(
        0u128,
        GLWE_SIZE,
        PolynomialSize(degree),
        CiphertextModulus::new_native(),
    )
}

/// Mask and body polynomials, mutably
pub(crate) fn split_mut(
    glwe: &mut Glwe,
) -> (Polynomial<&mut [u128]>, Polynomial<&mut [u128]>) {
    let degree = glwe.polynomial_size().0;
    let (mask, body) = glwe.as_mut().split_at_mut(degree);
    (Polynomial::from_container(mask), Polynomial::from_container(body))
}

/// Mask and body polynomials
pub(crate) fn split(glwe: &Glwe) -> (Polynomial<&[u128]>, Polynomial<&[u128]>) {
    let degree = glwe.polynomial_size().0;
    let (mask, body) = glwe.as_ref().split_at(degree);
    (Polynomial::from_container(mask), Polynomial::from_container(body))
}

/// `x mod 2^bits`
pub(crate) fn reduce(x: u128, bits: u32) -> u128 {
    if bits >= 128 { x } else { x & ((1u128 << bits) - 1) }
}

/// Representative of `x mod 2^bits` in `[-2^(bits-1), 2^(bits-1))`
pub(crate) fn center(x: u128, bits: u32) -> i128 {
    if bits >= 128 {
        return x as i128;
    }
    let x = reduce(x, bits);
    if x >= 1u128 << (bits - 1) {
        x.wrapping_sub(1u128 << bits) as i128
    } else {
        x as i128
    }
}

/// Reduce every coefficient to the level's modulus
pub(crate) fn reduce_all(glwe: &mut Glwe, bits: u32) {
    glwe.as_mut().iter_mut().for_each(|c| *c = reduce(*c, bits));
}

/// Modulus switch from `2^bits` to `2^(bits - shift)`
///
/// Each coefficient becomes `round(c / 2^shift)`; the decryption
/// `body - mask * s` is divided by `2^shift` up to a rounding error of about
/// `|s|_1 / 2`.
pub(crate) fn rescale(glwe: &mut Glwe, bits: u32, shift: u32) {
    let half = 1u128 << (shift - 1);
    for c in glwe.as_mut().iter_mut() {
        // At bits = 128 the addition may wrap; the shifted result is still
        // correct modulo 2^(bits - shift).
        let rounded = reduce(*c, bits).wrapping_add(half) >> shift;
        *c = reduce(rounded, bits - shift);
    }
}

/// Signed integers as ring coefficients
pub(crate) fn from_signed(values: &[i128]) -> Polynomial<Vec<u128>> {
    Polynomial::from_container(values.iter().map(|v| *v as u128).collect())
}

/// Serialize as `[mask: n × u128][body: n × u128]`
pub(crate) fn write_to(glwe: &Glwe, out: &mut Vec<u8>) {
    for c in glwe.as_ref() {
        out.extend(c.to_le_bytes());
    }
}

pub(crate) fn read_from(reader: &mut ByteReader<'_>, degree: usize) -> RlweResult<Glwe> {
    let len = GLWE_SIZE.0 * degree;
    let mut coeffs = Vec::with_capacity(len);
    for _ in 0..len {
        coeffs.push(reader.u128()?);
    }
    Ok(GlweCiphertext::from_container(
        coeffs,
        PolynomialSize(degree),
        CiphertextModulus::new_native(),
    ))
}
