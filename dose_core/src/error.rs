//! Error types for the dose_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dose_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client input was missing or malformed
    #[error("{0}")]
    Validation(String),

    /// A query parameter could not be interpreted
    #[error("{0}")]
    InvalidParameter(String),

    /// Database error (connection, query, decoding)
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error was caused by the caller's input.
    ///
    /// Only validation failures count; malformed query parameters and every
    /// downstream failure are reported as internal errors.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
