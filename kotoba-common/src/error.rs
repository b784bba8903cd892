//! Common error types for Kotoba

use thiserror::Error;

/// Common result type for Kotoba operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Kotoba crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Activity content or content pack (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input, or a stored value that violates a domain invariant
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
