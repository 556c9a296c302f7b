//! Identity service client for sign-in and token refresh.
//!
//! This module talks to the Firebase Authentication REST API: the Identity
//! Toolkit for email/password sign-in and the Secure Token API for exchanging
//! a refresh token for a fresh ID token.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tanzania_social_core::UserId;

use crate::error::{AuthError, Result};
use crate::FirebaseConfig;

/// Request payload for email/password sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Form payload for the token refresh endpoint.
#[derive(Debug, Clone, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

/// Response from a successful sign-in or token refresh.
#[derive(Debug, Clone)]
pub struct SignInResponse {
    /// Signed-in user.
    pub user_id: UserId,
    /// Short-lived ID token, sent as the bearer token.
    pub id_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// When the ID token expires.
    pub expires_at: DateTime<Utc>,
}

/// Raw response from `accounts:signInWithPassword`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignInResponse {
    local_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// Raw response from the secure token endpoint.
#[derive(Debug, Deserialize)]
struct RawRefreshResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// Error body returned by both APIs.
#[derive(Debug, Deserialize)]
struct IdentityErrorResponse {
    error: IdentityErrorDetail,
}

#[derive(Debug, Deserialize)]
struct IdentityErrorDetail {
    message: String,
}

/// Which endpoint produced an error; the same code maps differently.
#[derive(Debug, Clone, Copy)]
enum Flow {
    SignIn,
    Refresh,
}

/// Client for the Firebase Authentication REST API.
#[derive(Debug, Clone)]
pub struct FirebaseAuthClient {
    config: FirebaseConfig,
    client: reqwest::Client,
}

impl FirebaseAuthClient {
    /// Create a new client with the given configuration.
    #[must_use]
    pub fn new(config: FirebaseConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Create a new client with a custom reqwest client.
    #[must_use]
    pub fn with_client(config: FirebaseConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credentials are invalid (`InvalidCredentials`)
    /// - The account is disabled (`UserDisabled`)
    /// - Rate limit is exceeded (`RateLimited`)
    /// - Network or server error occurs
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignInResponse> {
        let url = self.config.sign_in_url();
        tracing::debug!(email = %email, "Signing in with password");

        let response = self
            .client
            .post(&url)
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::handle_error(response, Flow::SignIn).await);
        }

        let raw: RawSignInResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Internal(format!("invalid response: {e}")))?;

        build_response(&raw.local_id, raw.id_token, raw.refresh_token, &raw.expires_in)
    }

    /// Exchange a refresh token for a fresh ID token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The refresh token is expired, revoked or malformed (`TokenRefreshFailed`)
    /// - The account is disabled (`UserDisabled`)
    /// - Network or server error occurs
    pub async fn refresh(&self, refresh_token: &str) -> Result<SignInResponse> {
        let url = self.config.refresh_url();
        tracing::debug!("Refreshing ID token");

        let response = self
            .client
            .post(&url)
            .form(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token,
            })
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::handle_error(response, Flow::Refresh).await);
        }

        let raw: RawRefreshResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Internal(format!("invalid response: {e}")))?;

        build_response(&raw.user_id, raw.id_token, raw.refresh_token, &raw.expires_in)
    }

    /// Convert an error response into an `AuthError`.
    async fn handle_error(response: reqwest::Response, flow: Flow) -> AuthError {
        let status = response.status();

        let Ok(body) = response.json::<IdentityErrorResponse>().await else {
            return match status.as_u16() {
                429 => AuthError::RateLimited,
                _ => AuthError::Internal(format!("HTTP {status}")),
            };
        };

        // Codes may carry a suffix, e.g. "TOO_MANY_ATTEMPTS_TRY_LATER : ..."
        let code = body
            .error
            .message
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        tracing::warn!(status = %status, code = %code, "Identity service rejected request");

        match (code.as_str(), flow) {
            ("USER_DISABLED", _) => AuthError::UserDisabled,
            ("TOO_MANY_ATTEMPTS_TRY_LATER", _) => AuthError::RateLimited,
            (
                "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_LOGIN_CREDENTIALS"
                | "INVALID_EMAIL",
                Flow::SignIn,
            ) => AuthError::InvalidCredentials,
            (_, Flow::SignIn) => AuthError::SignInFailed(code),
            (_, Flow::Refresh) => AuthError::TokenRefreshFailed(code),
        }
    }
}

fn build_response(
    user_id: &str,
    id_token: String,
    refresh_token: String,
    expires_in: &str,
) -> Result<SignInResponse> {
    let user_id = UserId::new(user_id)
        .map_err(|e| AuthError::Internal(format!("invalid user id in response: {e}")))?;

    let invalid = || AuthError::Internal(format!("invalid expiresIn: {expires_in}"));
    let expires_in_secs: i64 = expires_in.parse().map_err(|_| invalid())?;
    let expires_at = chrono::TimeDelta::try_seconds(expires_in_secs)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(invalid)?;

    Ok(SignInResponse {
        user_id,
        id_token,
        refresh_token,
        expires_at,
    })
}
