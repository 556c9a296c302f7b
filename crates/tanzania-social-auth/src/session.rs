//! Session providers.
//!
//! A session is the signed-in user plus the ability to produce a currently
//! valid ID token. The request gateway only ever reads from a session; sign-in,
//! renewal and sign-out belong to the provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use tanzania_social_core::UserId;

use crate::client::{FirebaseAuthClient, SignInResponse};
use crate::error::{AuthError, Result};
use crate::token::IdTokenClaims;

/// Renew ID tokens this many seconds before they expire.
pub const REFRESH_SKEW_SECS: i64 = 300;

/// Source of the current user and their bearer token.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The signed-in user, if any. Never performs I/O.
    fn current_user(&self) -> Option<UserId>;

    /// A currently valid ID token, renewing it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or a fresh token cannot be
    /// obtained.
    async fn id_token(&self) -> Result<String>;
}

// =============================================================================
// FirebaseSession
// =============================================================================

#[derive(Debug, Clone)]
struct Credential {
    user_id: UserId,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(REFRESH_SKEW_SECS) < self.expires_at
    }
}

impl From<SignInResponse> for Credential {
    fn from(resp: SignInResponse) -> Self {
        Self {
            user_id: resp.user_id,
            id_token: resp.id_token,
            refresh_token: resp.refresh_token,
            expires_at: resp.expires_at,
        }
    }
}

/// A session backed by the Firebase Authentication REST API.
///
/// Starts signed out. The credential is renewed with the refresh token when
/// the ID token is within [`REFRESH_SKEW_SECS`] of expiring, and dropped when the
/// identity service rejects the refresh token.
pub struct FirebaseSession {
    client: FirebaseAuthClient,
    credential: RwLock<Option<Credential>>,
}

impl FirebaseSession {
    /// Create a signed-out session.
    #[must_use]
    pub fn new(client: FirebaseAuthClient) -> Self {
        Self {
            client,
            credential: RwLock::new(None),
        }
    }

    /// Sign in with email and password, replacing any existing credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity service rejects the credentials.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<UserId> {
        let resp = self.client.sign_in_with_password(email, password).await?;
        Ok(self.install(resp))
    }

    /// Restore a session from a previously issued refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is rejected.
    pub async fn restore(&self, refresh_token: &str) -> Result<UserId> {
        let resp = self.client.refresh(refresh_token).await?;
        Ok(self.install(resp))
    }

    /// Forget the current credential.
    pub fn sign_out(&self) {
        if let Some(cred) = self.credential.write().take() {
            tracing::info!(user_id = %cred.user_id, "Signed out");
        }
    }

    /// The refresh token of the current credential, for persisting a session.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.credential
            .read()
            .as_ref()
            .map(|c| c.refresh_token.clone())
    }

    fn install(&self, resp: SignInResponse) -> UserId {
        let cred = Credential::from(resp);
        let user_id = cred.user_id.clone();
        tracing::info!(user_id = %user_id, expires_at = %cred.expires_at, "Signed in");
        *self.credential.write() = Some(cred);
        user_id
    }

    async fn renew(&self, stale: Credential) -> Result<String> {
        tracing::debug!(user_id = %stale.user_id, "ID token near expiry, refreshing");

        match self.client.refresh(&stale.refresh_token).await {
            Ok(resp) => {
                let fresh = Credential::from(resp);
                let mut guard = self.credential.write();
                // A concurrent sign-out or sign-in wins over this refresh.
                let Some(current) = guard.as_ref() else {
                    tracing::debug!(user_id = %stale.user_id, "Signed out during refresh");
                    return Err(AuthError::NotSignedIn);
                };
                if current.refresh_token == stale.refresh_token {
                    let token = fresh.id_token.clone();
                    *guard = Some(fresh);
                    Ok(token)
                } else if current.user_id == stale.user_id {
                    // Another caller renewed first.
                    Ok(current.id_token.clone())
                } else {
                    Err(AuthError::NotSignedIn)
                }
            }
            Err(err) => {
                if err.invalidates_session() {
                    tracing::warn!(user_id = %stale.user_id, error = %err, "Session invalidated");
                    let mut guard = self.credential.write();
                    if guard
                        .as_ref()
                        .is_some_and(|c| c.refresh_token == stale.refresh_token)
                    {
                        *guard = None;
                    }
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl SessionProvider for FirebaseSession {
    fn current_user(&self) -> Option<UserId> {
        self.credential.read().as_ref().map(|c| c.user_id.clone())
    }

    async fn id_token(&self) -> Result<String> {
        let cred = self
            .credential
            .read()
            .clone()
            .ok_or(AuthError::NotSignedIn)?;

        if cred.is_fresh(Utc::now()) {
            return Ok(cred.id_token);
        }

        self.renew(cred).await
    }
}

// =============================================================================
// StaticSession
// =============================================================================

/// A session around an ID token minted elsewhere.
///
/// It cannot renew; once the token expires every call fails with
/// `TokenExpired`.
#[derive(Debug, Clone)]
pub struct StaticSession {
    user: Option<StaticUser>,
}

#[derive(Debug, Clone)]
struct StaticUser {
    user_id: UserId,
    id_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl StaticSession {
    /// A session with no signed-in user.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self { user: None }
    }

    /// A session for `user_id` that always hands out `id_token`.
    #[must_use]
    pub fn signed_in(user_id: UserId, id_token: impl Into<String>) -> Self {
        Self {
            user: Some(StaticUser {
                user_id,
                id_token: id_token.into(),
                expires_at: None,
            }),
        }
    }

    /// A session derived from the claims of an ID token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` if the token's claims cannot be read.
    pub fn from_id_token(id_token: impl Into<String>) -> Result<Self> {
        let id_token = id_token.into();
        let claims = IdTokenClaims::decode_unverified(&id_token)?;
        Ok(Self {
            user: Some(StaticUser {
                user_id: claims.user_id()?,
                expires_at: claims.expires_at(),
                id_token,
            }),
        })
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.user_id.clone())
    }

    async fn id_token(&self) -> Result<String> {
        let user = self.user.as_ref().ok_or(AuthError::NotSignedIn)?;
        if user.expires_at.is_some_and(|exp| exp <= Utc::now()) {
            return Err(AuthError::TokenExpired);
        }
        Ok(user.id_token.clone())
    }
}

// =============================================================================
// MockSessionProvider
// =============================================================================

/// A scripted session for tests.
///
/// Counts token requests so tests can assert that no token was fetched.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockSessionProvider {
    user: Option<UserId>,
    token: std::result::Result<String, String>,
    token_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockSessionProvider {
    /// Signed in as `user_id`, always returning `token`.
    ///
    /// # Panics
    ///
    /// Panics if `user_id` is not a valid identifier.
    #[must_use]
    pub fn signed_in(user_id: &str, token: &str) -> Self {
        Self {
            user: Some(UserId::new(user_id).expect("valid test user id")),
            token: Ok(token.to_string()),
            token_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            user: None,
            token: Err("not signed in".to_string()),
            token_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Signed in as `user_id`, but every token request fails with `reason`.
    ///
    /// # Panics
    ///
    /// Panics if `user_id` is not a valid identifier.
    #[must_use]
    pub fn failing_token(user_id: &str, reason: &str) -> Self {
        Self {
            user: Some(UserId::new(user_id).expect("valid test user id")),
            token: Err(reason.to_string()),
            token_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// How many times `id_token` was called.
    #[must_use]
    pub fn token_calls(&self) -> usize {
        self.token_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl SessionProvider for MockSessionProvider {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }

    async fn id_token(&self) -> Result<String> {
        self.token_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.user.is_none() {
            return Err(AuthError::NotSignedIn);
        }
        self.token
            .clone()
            .map_err(AuthError::TokenRefreshFailed)
    }
}
