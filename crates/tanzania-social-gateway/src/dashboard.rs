//! Screen logic without the screens.
//!
//! Each method is what one dashboard view does between the user pressing a
//! button and something being drawn: validate the input, call the gateway,
//! decode the payload into a view.

use std::sync::Arc;

use thiserror::Error;

use tanzania_social_core::{
    ContentAnalysis, CoreError, Recommendation, Recommendations, SearchResult, SearchResults,
};

use crate::content_url::{ContentUrl, InvalidUrl};
use crate::error::GatewayError;
use crate::gateway::RequestGateway;
use crate::history::HistoryStore;

/// Errors surfaced to a presentation layer.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The search box was blank.
    #[error("query is empty")]
    EmptyQuery,

    /// The URL was rejected before any call was made.
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrl),

    /// The gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The call succeeded but the payload was not the expected view.
    #[error(transparent)]
    Shape(#[from] CoreError),
}

/// The non-visual half of the search, analysis and recommendation screens.
#[derive(Clone)]
pub struct Dashboard {
    gateway: RequestGateway,
    history: Arc<dyn HistoryStore>,
}

impl Dashboard {
    /// Create a dashboard over `gateway`, recording searches in `history`.
    #[must_use]
    pub fn new(gateway: RequestGateway, history: Arc<dyn HistoryStore>) -> Self {
        Self { gateway, history }
    }

    /// The underlying gateway.
    #[must_use]
    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    /// Search and record the query in the user's history.
    ///
    /// The query is sent as typed. A failure to record history is logged and
    /// does not fail the search.
    ///
    /// # Errors
    ///
    /// Returns `EmptyQuery` for a blank query without calling the gateway,
    /// otherwise a gateway or shape error.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, DashboardError> {
        if query.trim().is_empty() {
            return Err(DashboardError::EmptyQuery);
        }

        let SearchResults(results) = self.gateway.query_search(query).await?.decode()?;

        if let Err(e) = self.history.record(query).await {
            tracing::warn!(error = %e, "Failed to record search history");
        }

        Ok(results)
    }

    /// Validate `raw_url` and analyze the post behind it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` without calling the gateway if the URL is not an
    /// `http`/`https` URL, otherwise a gateway or shape error.
    pub async fn analyze(&self, raw_url: &str) -> Result<ContentAnalysis, DashboardError> {
        let url = ContentUrl::parse(raw_url)?;
        let payload = self.gateway.analyze_social_content(&url).await?;
        Ok(payload.decode()?)
    }

    /// Recommendations for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns a gateway or shape error.
    pub async fn recommendations(&self) -> Result<Vec<Recommendation>, DashboardError> {
        let Recommendations(recs) = self.gateway.fetch_recommendations().await?.decode()?;
        Ok(recs)
    }

    /// The signed-in user's recent queries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a gateway error.
    pub async fn history(&self) -> Result<Vec<String>, DashboardError> {
        Ok(self.history.load().await?)
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}
