//! Error types for kotoba-ap
//!
//! Playback problems never surface here; they are published in
//! `AudioState::error`. These errors cover the use cases and setup.

use thiserror::Error;

/// Main error type for kotoba-ap
#[derive(Error, Debug)]
pub enum Error {
    /// Store, import or configuration error from kotoba-common
    #[error(transparent)]
    Common(#[from] kotoba_common::Error),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playback setup errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience Result type using kotoba-ap Error
pub type Result<T> = std::result::Result<T, Error>;
