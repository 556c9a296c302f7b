//! Session management for the Tanzania Social Analyzer client.
//!
//! This crate owns everything about "who is calling":
//!
//! - Email/password sign-in and token refresh against the Firebase
//!   Authentication REST API
//! - A [`SessionProvider`] trait that the request gateway reads a bearer
//!   token from on every call
//! - Concrete providers with an explicit lifecycle (no global state)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ RequestGateway   │────▶│ SessionProvider  │
//! │                  │     │ (trait)          │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                 ┌─────────────────┼──────────────────┐
//!                 │                 │                  │
//!        ┌────────▼───────┐ ┌───────▼────────┐ ┌───────▼────────┐
//!        │FirebaseSession │ │ StaticSession  │ │ MockSession-   │
//!        │(renewing)      │ │ (fixed token)  │ │ Provider(tests)│
//!        └────────┬───────┘ └────────────────┘ └────────────────┘
//!                 │ HTTPS
//!        ┌────────▼───────────┐
//!        │ Identity Toolkit / │
//!        │ Secure Token API   │
//!        └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tanzania_social_auth::{FirebaseAuthClient, FirebaseConfig, FirebaseSession, SessionProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FirebaseConfig {
//!     api_key: "AIza...".to_string(),
//!     project_id: "tz-social".to_string(),
//!     ..FirebaseConfig::default()
//! };
//!
//! let session = FirebaseSession::new(FirebaseAuthClient::new(config));
//! session.sign_in_with_password("analyst@example.com", "secret").await?;
//!
//! let token = session.id_token().await?;
//! println!("user: {:?}, token length: {}", session.current_user(), token.len());
//!
//! session.sign_out();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod session;
pub mod token;

pub use client::{FirebaseAuthClient, SignInResponse};
pub use error::{AuthError, Result};
pub use session::{FirebaseSession, SessionProvider, StaticSession};
pub use token::IdTokenClaims;

#[cfg(any(test, feature = "test-utils"))]
pub use session::MockSessionProvider;

/// Default base URL of the Identity Toolkit API.
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";

/// Default base URL of the Secure Token API.
pub const DEFAULT_SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com";

/// Web app configuration for the identity provider.
///
/// Only `api_key` is used by the REST calls in this crate; the remaining
/// fields are passed through so callers can hand a single config around.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key.
    pub api_key: String,
    /// Auth domain (e.g., `tz-social.firebaseapp.com`).
    pub auth_domain: String,
    /// Project ID.
    pub project_id: String,
    /// Storage bucket.
    pub storage_bucket: String,
    /// Messaging sender ID.
    pub messaging_sender_id: String,
    /// App ID.
    pub app_id: String,
    /// Base URL of the Identity Toolkit API (overridable for the emulator).
    pub identity_base_url: String,
    /// Base URL of the Secure Token API (overridable for the emulator).
    pub secure_token_base_url: String,
}

impl FirebaseConfig {
    /// Get the email/password sign-in endpoint URL.
    #[must_use]
    pub fn sign_in_url(&self) -> String {
        format!(
            "{}/v1/accounts:signInWithPassword?key={}",
            self.identity_base_url.trim_end_matches('/'),
            self.api_key
        )
    }

    /// Get the token refresh endpoint URL.
    #[must_use]
    pub fn refresh_url(&self) -> String {
        format!(
            "{}/v1/token?key={}",
            self.secure_token_base_url.trim_end_matches('/'),
            self.api_key
        )
    }
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            auth_domain: String::new(),
            project_id: String::new(),
            storage_bucket: String::new(),
            messaging_sender_id: String::new(),
            app_id: String::new(),
            identity_base_url: DEFAULT_IDENTITY_URL.to_string(),
            secure_token_base_url: DEFAULT_SECURE_TOKEN_URL.to_string(),
        }
    }
}
