//! RLWE ciphertexts and their native serialization
//!
//! ```text
//! [magic "BSRV"][version u8][context_id 32][degree u32][modulus_bits u32]
//! [scale_bits u32][plain_scale_bits u32][offset u32][len u32][clean u8]
//! [message_bound f64][noise_bound f64][mask: n × u128][body: n × u128]
//! ```
//!
//! Everything before the mask is a function of the context parameters and
//! of the operations applied, never of the encrypted values.

use crate::context::ContextId;
use crate::error::{RlweError, RlweResult};
use crate::glwe::{self, Glwe};
use crate::params::{GUARD_BITS, MODULUS_BITS};
use crate::wire::ByteReader;

const MAGIC: &[u8; 4] = b"BSRV";
const VERSION: u8 = 2;

/// Bytes preceding the GLWE coefficients
pub(crate) const HEADER_LEN: usize = 4 + 1 + 32 + 6 * 4 + 1 + 2 * 8;

/// Which coefficients hold the logical slots
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotLayout {
    /// First coefficient of the window
    pub offset: usize,
    /// Number of logical slots
    pub len: usize,
    /// Every coefficient outside the window encrypts zero
    pub clean: bool,
}

impl SlotLayout {
    pub fn packed(len: usize) -> Self {
        Self {
            offset: 0,
            len,
            clean: true,
        }
    }

    pub fn window(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// An encrypted vector of reals
///
/// The bounds are worst-case figures derived from the public value limit,
/// the plaintext operands and the parameters.
#[derive(Clone, Debug)]
pub struct Ciphertext {
    pub(crate) context_id: ContextId,
    pub(crate) glwe: Glwe,
    /// The ciphertext is meaningful modulo `2^modulus_bits`
    pub(crate) modulus_bits: u32,
    /// log2 of the scale the slots are currently encoded at
    pub(crate) scale_bits: u32,
    /// log2 of the scale plaintext operands are encoded at
    pub(crate) plain_scale_bits: u32,
    pub(crate) layout: SlotLayout,
    /// Upper bound on |encoded message| in any coefficient
    pub(crate) message_bound: f64,
    /// Upper bound on |decryption noise| in any coefficient
    pub(crate) noise_bound: f64,
}

impl Ciphertext {
    pub fn context_id(&self) -> &ContextId {
        &self.context_id
    }

    pub fn scale_bits(&self) -> u32 {
        self.scale_bits
    }

    /// Current ciphertext modulus is `2^modulus_bits`
    pub fn modulus_bits(&self) -> u32 {
        self.modulus_bits
    }

    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    /// Logical length (number of encrypted slots)
    pub fn slot_count(&self) -> usize {
        self.layout.len
    }

    pub fn degree(&self) -> usize {
        self.glwe.polynomial_size().0
    }

    /// Remaining headroom before decryption could wrap, in bits
    pub fn headroom_bits(&self) -> f64 {
        (self.modulus_bits - GUARD_BITS) as f64
            - (self.message_bound + self.noise_bound).max(1.0).log2()
    }

    /// Fail if message plus noise could reach the wrap-around limit
    pub(crate) fn check_budget(self) -> RlweResult<Self> {
        let limit_bits = self.modulus_bits.saturating_sub(GUARD_BITS);
        let limit = 2f64.powi(limit_bits as i32);
        if self.scale_bits >= limit_bits || self.message_bound + self.noise_bound >= limit {
            return Err(RlweError::PrecisionExhausted(format!(
                "modulus 2^{}, scale 2^{}, message bound {:e}, noise bound {:e}",
                self.modulus_bits, self.scale_bits, self.message_bound, self.noise_bound
            )));
        }
        Ok(self)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let n = self.degree();
        let mut out = Vec::with_capacity(HEADER_LEN + 32 * n);
        out.extend(MAGIC);
        out.push(VERSION);
        out.extend(self.context_id);
        out.extend((n as u32).to_le_bytes());
        out.extend(self.modulus_bits.to_le_bytes());
        out.extend(self.scale_bits.to_le_bytes());
        out.extend(self.plain_scale_bits.to_le_bytes());
        out.extend((self.layout.offset as u32).to_le_bytes());
        out.extend((self.layout.len as u32).to_le_bytes());
        out.push(self.layout.clean as u8);
        out.extend(self.message_bound.to_le_bytes());
        out.extend(self.noise_bound.to_le_bytes());

        let mut reduced = self.glwe.clone();
        glwe::reduce_all(&mut reduced, self.modulus_bits);
        glwe::write_to(&reduced, &mut out);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> RlweResult<Self> {
        let mut reader = ByteReader::new(bytes);

        let magic: [u8; 4] = reader.array()?;
        if &magic != MAGIC {
            return Err(RlweError::Deserialization("bad ciphertext magic".into()));
        }
        let version = reader.u8()?;
        if version != VERSION {
            return Err(RlweError::Deserialization(format!(
                "unsupported ciphertext version {version}"
            )));
        }

        let context_id: ContextId = reader.array()?;
        let degree = reader.u32()? as usize;
        if !degree.is_power_of_two() || !(16..=32768).contains(&degree) {
            return Err(RlweError::Deserialization(format!(
                "invalid ring degree {degree}"
            )));
        }

        let modulus_bits = reader.u32()?;
        if !(GUARD_BITS + 1..=MODULUS_BITS).contains(&modulus_bits) {
            return Err(RlweError::Deserialization(format!(
                "modulus 2^{modulus_bits} out of range"
            )));
        }
        let scale_bits = reader.u32()?;
        let plain_scale_bits = reader.u32()?;
        if scale_bits >= modulus_bits || !(8..=40).contains(&plain_scale_bits) {
            return Err(RlweError::Deserialization("scale out of range".into()));
        }

        let offset = reader.u32()? as usize;
        let len = reader.u32()? as usize;
        let clean = match reader.u8()? {
            0 => false,
            1 => true,
            other => {
                return Err(RlweError::Deserialization(format!(
                    "invalid clean flag {other}"
                )));
            }
        };
        if len == 0 || offset + len > degree {
            return Err(RlweError::Deserialization(format!(
                "slot window {offset}+{len} outside degree {degree}"
            )));
        }

        let message_bound = reader.f64()?;
        let noise_bound = reader.f64()?;
        if !(message_bound.is_finite() && message_bound >= 0.0)
            || !(noise_bound.is_finite() && noise_bound >= 0.0)
        {
            return Err(RlweError::Deserialization("invalid bounds".into()));
        }

        let glwe = glwe::read_from(&mut reader, degree)?;
        reader.finish()?;

        Self {
            context_id,
            glwe,
            modulus_bits,
            scale_bits,
            plain_scale_bits,
            layout: SlotLayout {
                offset,
                len,
                clean,
            },
            message_bound,
            noise_bound,
        }
        .check_budget()
        .map_err(|e| RlweError::Deserialization(e.to_string()))
    }
}
