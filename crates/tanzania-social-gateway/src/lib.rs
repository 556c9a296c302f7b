//! Request gateway for the Tanzania Social Analyzer cloud functions.
//!
//! This crate is the only place that talks to the backend:
//!
//! - [`RequestGateway`]: authenticated calls to `ragQuery`,
//!   `analyzeSocialContent` and `getRecommendations`, normalized into a
//!   [`Payload`] or one of four [`GatewayError`] kinds
//! - [`FirestoreHistory`]: the per-user search history document
//! - [`Dashboard`]: input validation and typed decoding on top of both
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tanzania_social_auth::StaticSession;
//! use tanzania_social_gateway::{FunctionsConfig, RequestGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Arc::new(StaticSession::from_id_token("eyJhbGciOiJSUzI1NiJ9...")?);
//! let gateway = RequestGateway::new(FunctionsConfig::new("us-central1", "tz-social"), session);
//!
//! let payload = gateway.query_search("malaria awareness campaigns").await?;
//! println!("{}", payload.as_value());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod content_url;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod history;
pub mod payload;
mod response;

pub use content_url::{ContentUrl, InvalidUrl};
pub use dashboard::{Dashboard, DashboardError};
pub use error::{GatewayError, Result, FALLBACK_MESSAGE};
pub use gateway::RequestGateway;
pub use history::{FirestoreHistory, HistoryStore, NoopHistory};
pub use payload::Payload;

use tanzania_social_core::{Operation, UserId};

/// Default region cloud functions are deployed to.
pub const DEFAULT_REGION: &str = "us-central1";

/// Default base URL of the Firestore REST API.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

/// Where the cloud functions live.
#[derive(Debug, Clone)]
pub struct FunctionsConfig {
    /// Deployment region (e.g., `us-central1`).
    pub region: String,
    /// Project ID.
    pub project_id: String,
    /// Replaces `https://{region}-{project}.cloudfunctions.net` when set
    /// (emulator or tests).
    pub base_url: Option<String>,
}

impl FunctionsConfig {
    /// Configuration for a deployed project.
    #[must_use]
    pub fn new(region: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            project_id: project_id.into(),
            base_url: None,
        }
    }

    /// Send every call to `base_url` instead.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Get the host all functions are served from.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}-{}.cloudfunctions.net",
                self.region, self.project_id
            ),
        }
    }

    /// Get the URL of the function serving `operation`.
    #[must_use]
    pub fn endpoint(&self, operation: Operation) -> String {
        format!("{}/{}", self.base_url(), operation.function_name())
    }
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGION, "")
    }
}

/// Where search history documents live.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Base URL of the Firestore REST API.
    pub base_url: String,
    /// Project ID.
    pub project_id: String,
    /// Database ID.
    pub database: String,
    /// Collection holding one document per user.
    pub collection: String,
    /// Maximum number of queries kept per user.
    pub max_entries: usize,
}

impl FirestoreConfig {
    /// Configuration for `project_id` with default settings.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    /// Get the URL of `user`'s history document.
    #[must_use]
    pub fn document_url(&self, user: &UserId) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database,
            self.collection,
            user
        )
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FIRESTORE_URL.to_string(),
            project_id: String::new(),
            database: "(default)".to_string(),
            collection: "searchHistory".to_string(),
            max_entries: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_region_and_project() {
        let config = FunctionsConfig::new("europe-west1", "tz-social");
        assert_eq!(
            config.endpoint(Operation::QuerySearch),
            "https://europe-west1-tz-social.cloudfunctions.net/ragQuery"
        );
        assert_eq!(
            config.endpoint(Operation::ContentAnalysis),
            "https://europe-west1-tz-social.cloudfunctions.net/analyzeSocialContent"
        );
        assert_eq!(
            config.endpoint(Operation::RecommendationFetch),
            "https://europe-west1-tz-social.cloudfunctions.net/getRecommendations"
        );
    }

    #[test]
    fn base_url_override() {
        let config = FunctionsConfig::new("us-central1", "tz-social")
            .with_base_url("http://127.0.0.1:5001/tz-social/us-central1/");
        assert_eq!(
            config.endpoint(Operation::QuerySearch),
            "http://127.0.0.1:5001/tz-social/us-central1/ragQuery"
        );
    }

    #[test]
    fn default_functions_config() {
        let config = FunctionsConfig::default();
        assert_eq!(config.region, DEFAULT_REGION);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn history_document_url() {
        let config = FirestoreConfig::new("tz-social");
        let user = UserId::new("uid-42").unwrap();
        assert_eq!(
            config.document_url(&user),
            "https://firestore.googleapis.com/v1/projects/tz-social/databases/(default)/documents/searchHistory/uid-42"
        );
        assert_eq!(config.max_entries, 10);
    }
}
