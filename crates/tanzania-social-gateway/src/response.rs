//! Request authorization and response normalization.
//!
//! Shared by the gateway and the history store so both follow the same
//! failure taxonomy.

use serde::Deserialize;

use tanzania_social_auth::SessionProvider;
use tanzania_social_core::UserId;

use crate::error::{GatewayError, Result, FALLBACK_MESSAGE};
use crate::payload::Payload;

/// Error body convention: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Resolve the signed-in user and a bearer token for them.
///
/// Fails with `Unauthenticated` without touching the token accessor when no
/// user is signed in.
pub(crate) async fn authorize(session: &dyn SessionProvider) -> Result<(UserId, String)> {
    let user = session.current_user().ok_or(GatewayError::Unauthenticated)?;

    let token = session.id_token().await.map_err(|e| {
        tracing::warn!(user_id = %user, error = %e, "Failed to obtain ID token");
        GatewayError::from_token_error(&e)
    })?;

    Ok((user, token))
}

/// Extract the message a failed response carries, or the fallback.
pub(crate) fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

/// Turn an HTTP response into a payload or a typed failure.
pub(crate) async fn normalize(response: reqwest::Response) -> Result<Payload> {
    let status = response.status();
    let url = response.url().path().to_string();

    let body = response.bytes().await.map_err(|e| {
        GatewayError::ServiceUnavailable(format!("failed to read response body: {e}"))
    })?;

    if !status.is_success() {
        let message = error_message(&body);
        tracing::warn!(status = %status, path = %url, error = %message, "Remote call failed");
        return Err(GatewayError::RemoteError(message));
    }

    serde_json::from_slice(&body)
        .map(Payload::new)
        .map_err(|e| GatewayError::ServiceUnavailable(format!("malformed response: {e}")))
}
