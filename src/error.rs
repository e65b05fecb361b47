use std::io;
use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, SpuError>;

#[derive(Error, Debug)]
pub enum SpuError {
    #[error("Input output error: {0}")]
    IoError(#[from] io::Error),
    #[error("Save state error during {operation}: {reason}")]
    SaveStateError { operation: String, reason: String },
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
