//! Common error types.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by core types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invalid identifier was provided.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] crate::ids::IdError),

    /// A payload did not have the shape a view expected.
    #[error("unexpected payload shape: {0}")]
    Shape(String),

    /// An unknown operation name was given.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Shape(err.to_string())
    }
}
