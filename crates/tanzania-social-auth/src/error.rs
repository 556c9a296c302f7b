//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during sign-in or token retrieval.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No user is signed in.
    #[error("not signed in")]
    NotSignedIn,

    /// The email or password was rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account has been disabled by an administrator.
    #[error("user disabled")]
    UserDisabled,

    /// Too many attempts, rate limited.
    #[error("rate limited")]
    RateLimited,

    /// Sign-in failed for another reason reported by the identity service.
    #[error("sign-in failed: {0}")]
    SignInFailed(String),

    /// The refresh token was rejected; the session is no longer usable.
    #[error("token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// The ID token has expired and cannot be renewed.
    #[error("token expired")]
    TokenExpired,

    /// The token format is invalid.
    #[error("invalid token format: {0}")]
    InvalidToken(String),

    /// Transport failure or unexpected response.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns `true` if trying again later may succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Internal(_))
    }

    /// Returns `true` if the credential behind this error can never be used again.
    #[must_use]
    pub const fn invalidates_session(&self) -> bool {
        matches!(
            self,
            Self::TokenRefreshFailed(_) | Self::UserDisabled | Self::TokenExpired
        )
    }
}
