//! Error types for RLWE operations

#[derive(Debug, thiserror::Error)]
pub enum RlweError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    #[error("Ciphertext was produced under a different context")]
    ContextMismatch,

    #[error("Scale mismatch: 2^{left} vs 2^{right}")]
    ScaleMismatch { left: u32, right: u32 },

    #[error("Slot layout mismatch: {0}")]
    LayoutMismatch(String),

    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Precision budget exhausted: {0}")]
    PrecisionExhausted(String),

    #[error("Sampling failed: {0}")]
    Sampling(String),
}

pub type RlweResult<T> = Result<T, RlweError>;
