use thiserror::Error;

/// Errors produced by the record codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
