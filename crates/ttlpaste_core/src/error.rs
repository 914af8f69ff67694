//! Application error types for the paste store and its configuration.
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid paste id")]
    MalformedIdentifier,

    #[error("Paste not found")]
    NotFound,

    #[error("Reached maximum storage capacity")]
    QuotaExceeded,

    #[error("Gave up trying to find an unused random id after {0} tries")]
    IdentifierSpaceExhausted(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    StorageMessage(String),
}
