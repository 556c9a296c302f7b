//! Gateway error types.
//!
//! Every failure of a gateway call is exactly one of these four kinds. No
//! transport error type leaks out of the crate.

use tanzania_social_auth::AuthError;
use thiserror::Error;

/// A result type using `GatewayError`.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Message used when a failed response carries no usable error message.
pub const FALLBACK_MESSAGE: &str = "API request failed";

/// Errors returned by gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No user is signed in.
    #[error("not signed in")]
    Unauthenticated,

    /// A user is signed in but a fresh bearer token could not be obtained.
    #[error("could not obtain an ID token: {0}")]
    AuthTokenError(String),

    /// The server answered with a non-success status.
    #[error("{0}")]
    RemoteError(String),

    /// The request never produced a usable response.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl GatewayError {
    /// Map a token failure, treating a concurrent sign-out as unauthenticated.
    #[must_use]
    pub fn from_token_error(err: &AuthError) -> Self {
        match err {
            AuthError::NotSignedIn => Self::Unauthenticated,
            other => Self::AuthTokenError(other.to_string()),
        }
    }

    /// Returns `true` if the caller should prompt for sign-in.
    #[must_use]
    pub const fn needs_sign_in(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::AuthTokenError(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::ServiceUnavailable(err.to_string())
    }
}
