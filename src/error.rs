//! PromptGuard error types

use thiserror::Error;

/// PromptGuard error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or malformed key, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Detector catalog error (invalid pattern)
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Cryptographic error
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for PromptGuard operations
pub type Result<T> = std::result::Result<T, Error>;
