//! Per-user search history.
//!
//! The history lives in the backend document store, one document per user at
//! `searchHistory/{uid}`. This module reads and writes it over the Firestore
//! REST API with the same bearer token and failure taxonomy as the gateway.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use tanzania_social_auth::SessionProvider;
use tanzania_social_core::UserId;

use crate::error::{GatewayError, Result};
use crate::response::{authorize, normalize};
use crate::FirestoreConfig;

/// Storage for recent search queries of the signed-in user.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Recent queries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns one of the four [`GatewayError`] kinds.
    async fn load(&self) -> Result<Vec<String>>;

    /// Record `query` and return the updated history.
    ///
    /// # Errors
    ///
    /// Returns one of the four [`GatewayError`] kinds.
    async fn record(&self, query: &str) -> Result<Vec<String>>;
}

/// Put `query` at the front of `history`, dropping any earlier copy and
/// anything beyond `max` entries. Blank queries leave the history unchanged.
#[must_use]
pub fn push_recent(mut history: Vec<String>, query: &str, max: usize) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return history;
    }
    history.retain(|q| q != query);
    history.insert(0, query.to_string());
    history.truncate(max);
    history
}

// =============================================================================
// Firestore wire format
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    fields: HistoryFields,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    queries: Option<ArrayField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<TimestampField>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrayField {
    array_value: ArrayValue,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ArrayValue {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<FieldValue>,
}

/// A single Firestore value; only strings are meaningful here.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimestampField {
    timestamp_value: String,
}

impl Document {
    fn queries(self) -> Vec<String> {
        self.fields
            .queries
            .map(|a| {
                a.array_value
                    .values
                    .into_iter()
                    .filter_map(|v| v.string_value)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn from_queries(queries: &[String]) -> Self {
        Self {
            fields: HistoryFields {
                queries: Some(ArrayField {
                    array_value: ArrayValue {
                        values: queries
                            .iter()
                            .map(|q| FieldValue {
                                string_value: Some(q.clone()),
                            })
                            .collect(),
                    },
                }),
                updated_at: Some(TimestampField {
                    timestamp_value: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                }),
            },
        }
    }
}

// =============================================================================
// FirestoreHistory
// =============================================================================

/// History stored in Firestore.
///
/// `record` is a read-modify-write without a transaction; two concurrent
/// searches by the same user can drop one entry.
#[derive(Clone)]
pub struct FirestoreHistory {
    client: reqwest::Client,
    config: FirestoreConfig,
    session: Arc<dyn SessionProvider>,
}

impl FirestoreHistory {
    /// Create a history store that reads tokens from `session`.
    #[must_use]
    pub fn new(config: FirestoreConfig, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_client(reqwest::Client::new(), config, session)
    }

    /// Create a history store with a custom reqwest client.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        config: FirestoreConfig,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            client,
            config,
            session,
        }
    }

    async fn fetch(&self, user: &UserId, token: &str) -> Result<Vec<String>> {
        let url = self.config.document_url(user);

        let response = self.client.get(&url).bearer_auth(token).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(user_id = %user, "No search history yet");
            return Ok(Vec::new());
        }

        let doc: Document = normalize(response)
            .await?
            .decode()
            .map_err(|e| GatewayError::ServiceUnavailable(e.to_string()))?;

        Ok(doc.queries())
    }
}

#[async_trait]
impl HistoryStore for FirestoreHistory {
    async fn load(&self) -> Result<Vec<String>> {
        let (user, token) = authorize(self.session.as_ref()).await?;
        self.fetch(&user, &token).await
    }

    async fn record(&self, query: &str) -> Result<Vec<String>> {
        let (user, token) = authorize(self.session.as_ref()).await?;

        let current = self.fetch(&user, &token).await?;
        let updated = push_recent(current, query, self.config.max_entries);

        let response = self
            .client
            .patch(self.config.document_url(&user))
            .query(&[
                ("updateMask.fieldPaths", "queries"),
                ("updateMask.fieldPaths", "updatedAt"),
            ])
            .bearer_auth(&token)
            .json(&Document::from_queries(&updated))
            .send()
            .await?;

        normalize(response).await?;
        tracing::debug!(user_id = %user, entries = updated.len(), "Recorded search");

        Ok(updated)
    }
}

impl std::fmt::Debug for FirestoreHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreHistory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// NoopHistory
// =============================================================================

/// A history store for when persistence is disabled.
///
/// Loads nothing and records nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopHistory;

impl NoopHistory {
    /// Create a new no-op history store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HistoryStore for NoopHistory {
    async fn load(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn record(&self, query: &str) -> Result<Vec<String>> {
        tracing::debug!(query = %query, "NoopHistory: search history disabled");
        Ok(Vec::new())
    }
}
