use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BloomError>;

#[derive(Error, Debug)]
pub enum BloomError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Capacity must be greater than 0")]
    ZeroCapacity,

    #[error("False positive rate must be between 0 and 1, got {rate}")]
    InvalidFalsePositiveRate { rate: f64 },

    #[error("Bits per element must be a positive number, got {bits_per_element}")]
    InvalidBitsPerElement { bits_per_element: f64 },

    #[error("Number of hash rounds must be at least 1")]
    ZeroHashes,

    #[error("Index out of bounds: {index} >= {capacity}")]
    IndexOutOfBounds { index: usize, capacity: usize },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error(
        "Failed to parse environment variable {var_name}: value '{value}' - {error}"
    )]
    EnvParseError {
        var_name: String,
        value: String,
        error: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EncodeError> for BloomError {
    fn from(err: EncodeError) -> Self {
        BloomError::SerializationError(err.to_string())
    }
}

impl From<DecodeError> for BloomError {
    fn from(err: DecodeError) -> Self {
        BloomError::SerializationError(err.to_string())
    }
}
