use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HE backend error: {0}")]
    He(#[from] HeError),

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(#[from] base64::DecodeError),

    #[error("Invalid scoring model: {0}")]
    InvalidModel(String),
}

impl CoreError {
    /// True if a ciphertext met a context it was not produced under
    pub fn is_context_mismatch(&self) -> bool {
        matches!(self, CoreError::He(HeError::ContextMismatch))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Errors from HE backend operations
#[derive(Error, Debug)]
pub enum HeError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Invalid context: {0}")]
    InvalidContext(String),

    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error("Ciphertext does not belong to this context")]
    ContextMismatch,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("Scale mismatch: 2^{left} vs 2^{right}")]
    ScaleMismatch { left: u32, right: u32 },
}

pub type HeResult<T> = Result<T, HeError>;
