use blindscore_core::CoreError;
use blindscore_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
