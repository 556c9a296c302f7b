//! The request gateway.
//!
//! Translates a logical operation into an authenticated HTTP call against
//! the configured cloud functions host and normalizes the answer. Holds no
//! mutable state: calls are independent and may run concurrently.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use tanzania_social_auth::SessionProvider;
use tanzania_social_core::{Method, Operation};

use crate::content_url::ContentUrl;
use crate::error::{GatewayError, Result};
use crate::payload::Payload;
use crate::response::{authorize, normalize};
use crate::FunctionsConfig;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    url: &'a str,
}

/// Authenticated client for the three cloud functions.
///
/// Every call is fire-once: no retries, no backoff, no caching. The default
/// HTTP client sets no timeout; pass one through [`RequestGateway::with_client`]
/// if needed.
#[derive(Clone)]
pub struct RequestGateway {
    client: reqwest::Client,
    config: FunctionsConfig,
    session: Arc<dyn SessionProvider>,
}

impl RequestGateway {
    /// Create a gateway that reads tokens from `session`.
    #[must_use]
    pub fn new(config: FunctionsConfig, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_client(reqwest::Client::new(), config, session)
    }

    /// Create a gateway with a custom reqwest client.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        config: FunctionsConfig,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            client,
            config,
            session,
        }
    }

    /// The session this gateway reads tokens from.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    /// The endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &FunctionsConfig {
        &self.config
    }

    /// Run a retrieval-augmented search.
    ///
    /// # Errors
    ///
    /// Returns one of the four [`GatewayError`] kinds.
    pub async fn query_search(&self, query: &str) -> Result<Payload> {
        let body = serde_json::to_value(QueryRequest { query })
            .map_err(|e| GatewayError::ServiceUnavailable(e.to_string()))?;
        self.call(Operation::QuerySearch, Some(&body)).await
    }

    /// Analyze a social-media post.
    ///
    /// # Errors
    ///
    /// Returns one of the four [`GatewayError`] kinds.
    pub async fn analyze_social_content(&self, url: &ContentUrl) -> Result<Payload> {
        let body = serde_json::to_value(AnalyzeRequest { url: url.as_str() })
            .map_err(|e| GatewayError::ServiceUnavailable(e.to_string()))?;
        self.call(Operation::ContentAnalysis, Some(&body)).await
    }

    /// Fetch recommendations for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns one of the four [`GatewayError`] kinds.
    pub async fn fetch_recommendations(&self) -> Result<Payload> {
        self.call(Operation::RecommendationFetch, None).await
    }

    /// Invoke `operation`.
    ///
    /// `body` is sent only for operations that carry one; a `POST` without a
    /// body sends `{}`.
    ///
    /// # Errors
    ///
    /// Returns one of the four [`GatewayError`] kinds.
    pub async fn call(&self, operation: Operation, body: Option<&Value>) -> Result<Payload> {
        let (user, token) = authorize(self.session.as_ref()).await?;
        let url = self.config.endpoint(operation);

        tracing::debug!(
            operation = %operation,
            user_id = %user,
            url = %url,
            "Calling cloud function"
        );

        let request = match operation.method() {
            Method::Get => self.client.get(&url),
            Method::Post => {
                let empty = Value::Object(serde_json::Map::new());
                self.client.post(&url).json(body.unwrap_or(&empty))
            }
        };

        let response = request.bearer_auth(&token).send().await.map_err(|e| {
            tracing::warn!(operation = %operation, error = %e, "Request failed");
            GatewayError::from(e)
        })?;

        normalize(response).await
    }
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanzania_social_auth::MockSessionProvider;

    #[test]
    fn request_bodies_serialize() {
        let query = serde_json::to_string(&QueryRequest {
            query: "malaria awareness campaigns",
        })
        .unwrap();
        assert_eq!(query, r#"{"query":"malaria awareness campaigns"}"#);

        let analyze = serde_json::to_string(&AnalyzeRequest {
            url: "https://x.com/p/1",
        })
        .unwrap();
        assert_eq!(analyze, r#"{"url":"https://x.com/p/1"}"#);
    }

    #[tokio::test]
    async fn signed_out_call_fails_before_network() {
        // Unroutable host; reaching the network would be ServiceUnavailable.
        let config = FunctionsConfig::default().with_base_url("http://127.0.0.1:9");
        let session = Arc::new(MockSessionProvider::signed_out());
        let gateway = RequestGateway::new(config, session.clone());

        let result = gateway.fetch_recommendations().await;
        assert_eq!(result.unwrap_err(), GatewayError::Unauthenticated);
        assert_eq!(session.token_calls(), 0);
    }

    #[test]
    fn debug_hides_session() {
        let gateway = RequestGateway::new(
            FunctionsConfig::new("europe-west1", "tz-social"),
            Arc::new(MockSessionProvider::signed_in("uid", "secret-token")),
        );
        let debug = format!("{gateway:?}");
        assert!(debug.contains("europe-west1"));
        assert!(!debug.contains("secret-token"));
    }
}
