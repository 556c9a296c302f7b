//! Typed views over remote payloads.
//!
//! The gateway hands back opaque JSON. Callers that want display-ready
//! records decode one of these views from it; a payload that does not match
//! is a shape error at the caller, not a gateway failure.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Coarse quality bucket used when presenting scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Above the upper threshold.
    High,
    /// Above the lower threshold.
    Medium,
    /// Everything else.
    Low,
}

impl Tier {
    /// Bucket `value` with strict `>` comparisons against both thresholds.
    #[must_use]
    pub fn classify(value: f64, high: f64, medium: f64) -> Self {
        if value > high {
            Self::High
        } else if value > medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Human-readable display string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Decode a view from a JSON value.
///
/// # Errors
///
/// Returns `CoreError::Shape` if the value does not match `T`.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

// =============================================================================
// Search
// =============================================================================

/// One retrieved passage from a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Identifier of the deployment that produced the passage.
    pub id: String,
    /// Passage text.
    pub content: String,
    /// Retrieval confidence in `[0, 1]`.
    pub confidence: f64,
    /// Where the passage came from.
    pub source: String,
    /// When the source was published, if the backend supplied a usable value.
    pub timestamp: Option<DateTime<Utc>>,
}

impl SearchResult {
    /// Confidence bucket: high above 0.8, medium above 0.5.
    #[must_use]
    pub fn tier(&self) -> Tier {
        Tier::classify(self.confidence, 0.8, 0.5)
    }

    /// Confidence as a percentage with one decimal place.
    #[must_use]
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }

    /// The first `max_chars` characters of the content.
    #[must_use]
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}

/// The decoded result list of a query-search call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSearchResponse")]
pub struct SearchResults(pub Vec<SearchResult>);

#[derive(Deserialize)]
struct RawSearchResponse {
    predictions: Vec<RawPrediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrediction {
    deployment_resource_id: String,
    content: String,
    confidence: f64,
    metadata: RawPredictionMetadata,
}

#[derive(Deserialize)]
struct RawPredictionMetadata {
    source: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: Option<DateTime<Utc>>,
}

impl From<RawSearchResponse> for SearchResults {
    fn from(raw: RawSearchResponse) -> Self {
        Self(
            raw.predictions
                .into_iter()
                .map(|p| SearchResult {
                    id: p.deployment_resource_id,
                    content: p.content,
                    confidence: p.confidence,
                    source: p.metadata.source,
                    timestamp: p.metadata.timestamp,
                })
                .collect(),
        )
    }
}

/// Accept RFC 3339 strings or epoch milliseconds; anything else is `None`.
fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    })
}

// =============================================================================
// Content analysis
// =============================================================================

/// Engagement counters for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    /// Like count.
    pub likes: u64,
    /// Comment count.
    pub comments: u64,
    /// Share count.
    pub shares: u64,
}

/// Sentiment classification of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Label such as `Positive`, `Neutral` or `Negative`.
    pub label: String,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Sentiment {
    /// `Positive` is high, `Neutral` is medium, anything else is low.
    #[must_use]
    pub fn tier(&self) -> Tier {
        match self.label.as_str() {
            "Positive" => Tier::High,
            "Neutral" => Tier::Medium,
            _ => Tier::Low,
        }
    }
}

/// Result of a content-analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    /// Raw engagement counters.
    pub metrics: EngagementMetrics,
    /// Engagement rate in `[0, 1]`.
    pub engagement_rate: f64,
    /// Sentiment classification.
    pub sentiment: Sentiment,
}

impl ContentAnalysis {
    /// Engagement bucket: high above 0.7, medium above 0.4.
    #[must_use]
    pub fn engagement_tier(&self) -> Tier {
        Tier::classify(self.engagement_rate, 0.7, 0.4)
    }
}

// =============================================================================
// Recommendations
// =============================================================================

/// A creator recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Backend identifier; numeric ids are rendered as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Recommendation kind, e.g. `video` or `hashtag`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Estimated effectiveness as a percentage.
    pub effectiveness: f64,
    /// Optional worked example.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl Recommendation {
    /// Effectiveness bucket: high above 80, medium above 60.
    #[must_use]
    pub fn tier(&self) -> Tier {
        Tier::classify(self.effectiveness, 80.0, 60.0)
    }

    /// Whether this recommendation is about video content.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == "video"
    }
}

/// The decoded list of a recommendation-fetch call.
///
/// The backend currently returns a bare array. An object wrapping the array
/// under `recommendations` is accepted as well so the client keeps working if
/// the function is brought in line with the other two operations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawRecommendations")]
pub struct Recommendations(pub Vec<Recommendation>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecommendations {
    List(Vec<Recommendation>),
    Wrapped { recommendations: Vec<Recommendation> },
}

impl From<RawRecommendations> for Recommendations {
    fn from(raw: RawRecommendations) -> Self {
        match raw {
            RawRecommendations::List(list) => Self(list),
            RawRecommendations::Wrapped { recommendations } => Self(recommendations),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
