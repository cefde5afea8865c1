//! Fixed-point encoding of reals

use crate::error::{RlweError, RlweResult};
use crate::params::{GUARD_BITS, MODULUS_BITS};

const ENCODE_LIMIT_BITS: u32 = MODULUS_BITS - GUARD_BITS;

pub(crate) fn pow2(bits: u32) -> f64 {
    2f64.powi(bits as i32)
}

/// `round(value * 2^scale_bits)`, refusing anything that would not fit
pub(crate) fn encode_real(value: f64, scale_bits: u32) -> RlweResult<i128> {
    if !value.is_finite() {
        return Err(RlweError::OutOfRange(format!("{value} is not finite")));
    }
    let scaled = (value * pow2(scale_bits)).round();
    if scaled.abs() >= pow2(ENCODE_LIMIT_BITS) {
        return Err(RlweError::OutOfRange(format!(
            "{value} at scale 2^{scale_bits} exceeds 2^{ENCODE_LIMIT_BITS}"
        )));
    }
    Ok(scaled as i128)
}

pub(crate) fn decode_real(centered: i128, scale_bits: u32) -> f64 {
    centered as f64 / pow2(scale_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let encoded = encode_real(-12.375, 20).unwrap();
        assert_eq!(encoded, -12_976_128);
        assert_eq!(decode_real(encoded, 20), -12.375);
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(encode_real(f64::NAN, 10).is_err());
        assert!(encode_real(f64::INFINITY, 10).is_err());
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(matches!(
            encode_real(1e30, 40),
            Err(RlweError::OutOfRange(_))
        ));
    }
}
