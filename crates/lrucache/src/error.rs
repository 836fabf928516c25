//! Error types for lrucache

use std::fmt;

/// Result type alias for lrucache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while building a cache
///
/// Cache operations themselves never fail: a miss is `None`, and eviction
/// or overwrite is handled internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Construction parameters are unusable (e.g. zero capacity)
    InvalidConfiguration(String),

    /// Configuration document could not be decoded
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
