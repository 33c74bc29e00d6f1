//! Error types for the Inkwell domain.
//!
//! Uses `thiserror` for ergonomic error definitions. [`Error`] is the
//! caller-facing taxonomy; [`StoreError`] belongs to the Record Store and is
//! translated by the services before it reaches a caller.

use thiserror::Error;

/// The top-level error type for all Inkwell operations.
///
/// Every variant maps to exactly one transport status (see the gateway).
/// `Internal` carries an opaque message that is safe to show a caller;
/// the underlying detail is logged where the failure is observed.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing input. The caller's fault.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(NotFound),

    /// A unique field is already taken.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

/// Which lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("Session not found")]
    Session,

    #[error("Question not found")]
    Question,
}

impl From<NotFound> for Error {
    fn from(value: NotFound) -> Self {
        Error::NotFound(value)
    }
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by a Record Store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
