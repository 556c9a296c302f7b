//! ID token inspection.
//!
//! Reads the claims segment of an ID token without verifying its signature.
//! The backend verifies every token it receives; the client only needs the
//! user id and expiry.

use base64::prelude::*;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use tanzania_social_core::UserId;

use crate::error::{AuthError, Result};

/// Claims read from an ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    /// Subject; equal to the user id for Firebase tokens.
    pub sub: String,
    /// Firebase-specific copy of the user id.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Email address, if the account has one.
    #[serde(default)]
    pub email: Option<String>,
    /// Expiry as seconds since the epoch.
    pub exp: i64,
}

impl IdTokenClaims {
    /// Decode the claims of a compact JWS without verifying it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` if the token is not three dot-separated segments
    /// or the payload is not base64url-encoded JSON.
    pub fn decode_unverified(token: &str) -> Result<Self> {
        let mut parts = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken("expected three segments".to_string()));
        };

        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| AuthError::InvalidToken(format!("invalid base64: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::InvalidToken(format!("invalid claims: {e}")))
    }

    /// The user the token was issued to.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` if neither `user_id` nor `sub` is a valid id.
    pub fn user_id(&self) -> Result<UserId> {
        let raw = self.user_id.as_deref().unwrap_or(&self.sub);
        UserId::new(raw).map_err(|e| AuthError::InvalidToken(format!("invalid subject: {e}")))
    }

    /// When the token expires.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: &serde_json::Value) -> String {
    let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = BASE64_URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}
