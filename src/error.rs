//! Error types for rangedel.

use thiserror::Error;

/// Result type alias for rangedel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for range deletion aggregation.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Data corruption detected.
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// A collaborator was handed input that breaks its contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Internal error, also used by collaborators (table builders,
    /// tombstone sources) to report their own failures.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a corruption error with the given message.
    pub fn corruption<S: Into<String>>(msg: S) -> Self {
        Error::Corruption(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Check if this error indicates corruption.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_))
    }
}
