//! RLWE scheme parameters

use tfhe::core_crypto::prelude::*;

use crate::error::{RlweError, RlweResult};
use crate::wire::ByteReader;

/// Fresh ciphertexts live modulo `2^MODULUS_BITS` (native `u128` arithmetic)
pub const MODULUS_BITS: u32 = 128;

/// Messages plus noise must stay below `2^(modulus_bits - GUARD_BITS)` so the
/// centered lift at decryption is unambiguous
pub const GUARD_BITS: u32 = 2;

/// Smallest slot scale a context or a rescale may leave
pub const MIN_SCALE_BITS: u32 = 8;

/// Rescaled multiplications every context must support: a dot product
/// followed by a scalar multiplication
pub const MIN_DEPTH: u32 = 2;

/// Encoded size of [`RlweParams`] in bytes
pub(crate) const PARAMS_LEN: usize = 4 + 4 + 4 + 4 + 8;

/// RLWE parameters
///
/// Every multiplication by a plaintext is followed by a rescale that divides
/// by `2^plain_scale_bits`, dropping the ciphertext modulus by the same
/// amount. The modulus chain is therefore
/// `2^128, 2^(128 - p), 2^(128 - 2p), ...` and the slot scale stays at
/// `2^scale_bits` between operations.
#[derive(Clone, Debug, PartialEq)]
pub struct RlweParams {
    /// Ring dimension `n` (power of two); also the slot capacity
    pub poly_degree: usize,
    /// log2 of the global scale used to encode reals
    pub scale_bits: u32,
    /// log2 of the scale plaintext operands are encoded at; also the
    /// modulus drop per rescale
    pub plain_scale_bits: u32,
    /// Public bound on inputs: every encrypted value satisfies
    /// `|v| <= 2^value_bits`
    pub value_bits: u32,
    /// Standard deviation of the Gaussian error, in coefficient units
    pub noise_std: f64,
}

impl RlweParams {
    /// `n = 8192`, `q = 2^128`, scale `2^30`
    ///
    /// Within the HomomorphicEncryption.org bound for 128-bit security with
    /// a binary secret (log q ≤ 218 at n = 8192).
    pub fn default_128bit() -> Self {
        Self {
            poly_degree: 8192,
            scale_bits: 30,
            plain_scale_bits: 30,
            value_bits: 24,
            noise_std: 3.2,
        }
    }

    /// Small ring for fast tests. NOT SECURE.
    pub fn insecure_testing() -> Self {
        Self {
            poly_degree: 1024,
            ..Self::default_128bit()
        }
    }

    /// The global scale `2^scale_bits`
    pub fn scale(&self) -> f64 {
        2f64.powi(self.scale_bits as i32)
    }

    /// Largest absolute value [`encrypt`](crate::encrypt) accepts
    pub fn value_limit(&self) -> f64 {
        2f64.powi(self.value_bits as i32)
    }

    /// Rescaled multiplications available before a value at the input limit
    /// could wrap
    pub fn max_depth(&self) -> u32 {
        let needed = self.scale_bits + self.value_bits + GUARD_BITS;
        MODULUS_BITS.saturating_sub(needed) / self.plain_scale_bits.max(1)
    }

    /// Error distribution handed to tfhe, as a fraction of the native modulus
    pub(crate) fn noise_distribution(&self) -> DynamicDistribution<u128> {
        DynamicDistribution::new_gaussian_from_std_dev(StandardDev(
            self.noise_std / 2f64.powi(MODULUS_BITS as i32),
        ))
    }

    pub(crate) fn polynomial_size(&self) -> PolynomialSize {
        PolynomialSize(self.poly_degree)
    }

    pub fn validate(&self) -> RlweResult<()> {
        if !self.poly_degree.is_power_of_two() || !(16..=32768).contains(&self.poly_degree) {
            return Err(RlweError::InvalidParams(format!(
                "poly_degree must be a power of two in [16, 32768], got {}",
                self.poly_degree
            )));
        }
        if !(MIN_SCALE_BITS..=40).contains(&self.scale_bits) {
            return Err(RlweError::InvalidParams(format!(
                "scale_bits must be in [{MIN_SCALE_BITS}, 40], got {}",
                self.scale_bits
            )));
        }
        if !(8..=40).contains(&self.plain_scale_bits) {
            return Err(RlweError::InvalidParams(format!(
                "plain_scale_bits must be in [8, 40], got {}",
                self.plain_scale_bits
            )));
        }
        if !(1..=48).contains(&self.value_bits) {
            return Err(RlweError::InvalidParams(format!(
                "value_bits must be in [1, 48], got {}",
                self.value_bits
            )));
        }
        if !self.noise_std.is_finite() || self.noise_std <= 0.0 || self.noise_std > 64.0 {
            return Err(RlweError::InvalidParams(format!(
                "noise_std must be in (0, 64], got {}",
                self.noise_std
            )));
        }
        if self.max_depth() < MIN_DEPTH {
            return Err(RlweError::InvalidParams(format!(
                "scale 2^{} with inputs up to 2^{} leaves room for {} rescaled \
                 multiplications at 2^{} per level, need {MIN_DEPTH}",
                self.scale_bits,
                self.value_bits,
                self.max_depth(),
                self.plain_scale_bits
            )));
        }
        Ok(())
    }

    /// Serialize as
    /// `[degree u32][scale_bits u32][plain_scale_bits u32][value_bits u32][noise_std f64]`
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend((self.poly_degree as u32).to_le_bytes());
        out.extend(self.scale_bits.to_le_bytes());
        out.extend(self.plain_scale_bits.to_le_bytes());
        out.extend(self.value_bits.to_le_bytes());
        out.extend(self.noise_std.to_le_bytes());
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>) -> RlweResult<Self> {
        let params = Self {
            poly_degree: reader.u32()? as usize,
            scale_bits: reader.u32()?,
            plain_scale_bits: reader.u32()?,
            value_bits: reader.u32()?,
            noise_std: reader.f64()?,
        };
        params
            .validate()
            .map_err(|e| RlweError::Deserialization(e.to_string()))?;
        Ok(params)
    }
}

impl Default for RlweParams {
    fn default() -> Self {
        Self::default_128bit()
    }
}
