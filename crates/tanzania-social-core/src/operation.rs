//! The catalogue of remote operations.
//!
//! Each logical operation maps to exactly one cloud function and one HTTP
//! method. Endpoint hosts are configuration and live with the gateway.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// HTTP method used by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`, no request body.
    Get,
    /// `POST` with a JSON body.
    Post,
}

impl Method {
    /// The method name as it appears on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A logical remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Retrieval-augmented search over the knowledge base.
    QuerySearch,
    /// Engagement and sentiment analysis of a social-media post.
    ContentAnalysis,
    /// Creator recommendations for the signed-in user.
    RecommendationFetch,
}

impl Operation {
    /// All operations, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::QuerySearch,
        Self::ContentAnalysis,
        Self::RecommendationFetch,
    ];

    /// The logical name (`query-search`, `content-analysis`,
    /// `recommendation-fetch`).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::QuerySearch => "query-search",
            Self::ContentAnalysis => "content-analysis",
            Self::RecommendationFetch => "recommendation-fetch",
        }
    }

    /// The deployed cloud function name.
    #[must_use]
    pub const fn function_name(&self) -> &'static str {
        match self {
            Self::QuerySearch => "ragQuery",
            Self::ContentAnalysis => "analyzeSocialContent",
            Self::RecommendationFetch => "getRecommendations",
        }
    }

    /// The HTTP method for this operation.
    #[must_use]
    pub const fn method(&self) -> Method {
        match self {
            Self::QuerySearch | Self::ContentAnalysis => Method::Post,
            Self::RecommendationFetch => Method::Get,
        }
    }

    /// Whether the operation carries a JSON request body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        matches!(self.method(), Method::Post)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| CoreError::UnknownOperation(s.to_string()))
    }
}
