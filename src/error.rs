// src/error.rs

//! Error types for image tooling operations

use thiserror::Error;

/// Errors raised by the library
#[derive(Error, Debug)]
pub enum Error {
    /// The package index has no such package or release
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport error, unexpected HTTP status, or malformed payload
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// A version string that does not follow PEP 440
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// A requirement or version range that could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Reading or writing a vars file or deploy script failed
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A probed service never accepted a connection
    #[error("Unreachable: {0}")]
    Unreachable(String),
}

impl Error {
    /// Whether this error means the index has no record of the request
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
