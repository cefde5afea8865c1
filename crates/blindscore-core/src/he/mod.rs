pub mod backends;
pub mod traits;

pub use traits::HeBackend;

use crate::error::HeError;

/// Identifies which backend produced a context or ciphertext
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum BackendId {
    /// Coefficient-packed RLWE over Z_{2^128}[X]/(X^n + 1)
    #[serde(rename = "rlwe")]
    Rlwe = 0,
    /// Mock backend for testing
    #[serde(rename = "mock")]
    Mock = 255,
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendId::Rlwe => write!(f, "rlwe"),
            BackendId::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for BackendId {
    type Err = HeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rlwe" | "lattice" | "ckks" => Ok(BackendId::Rlwe),
            "mock" | "test" => Ok(BackendId::Mock),
            other => Err(HeError::InvalidContext(format!("Unknown backend: {other}"))),
        }
    }
}

impl TryFrom<u8> for BackendId {
    type Error = HeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Rlwe),
            255 => Ok(Self::Mock),
            other => Err(HeError::InvalidContext(format!(
                "Unknown backend ID: {other}"
            ))),
        }
    }
}
