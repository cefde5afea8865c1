//! Little-endian byte reader shared by the native serializers

use crate::error::{RlweError, RlweResult};

pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn take(&mut self, len: usize) -> RlweResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                RlweError::Deserialization(format!(
                    "truncated: needed {len} bytes at offset {}, have {}",
                    self.pos,
                    self.bytes.len() - self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> RlweResult<[u8; N]> {
        let slice = self.take(N)?;
        slice
            .try_into()
            .map_err(|_| RlweError::Deserialization("invalid fixed-size field".into()))
    }

    pub(crate) fn u8(&mut self) -> RlweResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub(crate) fn u32(&mut self) -> RlweResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub(crate) fn u128(&mut self) -> RlweResult<u128> {
        Ok(u128::from_le_bytes(self.array()?))
    }

    pub(crate) fn f64(&mut self) -> RlweResult<f64> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    /// Fails if any bytes are left unread
    pub(crate) fn finish(self) -> RlweResult<()> {
        if self.pos != self.bytes.len() {
            return Err(RlweError::Deserialization(format!(
                "{} trailing bytes",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}
