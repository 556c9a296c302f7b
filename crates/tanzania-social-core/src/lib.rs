//! Core types for the Tanzania Social Analyzer client.
//!
//! This crate provides the foundational types shared by the other crates:
//!
//! - **Identifiers**: [`UserId`] for identity-provider users
//! - **Operations**: the catalogue of remote cloud functions
//! - **Views**: typed records decoded from opaque remote payloads
//!
//! # Example
//!
//! ```
//! use tanzania_social_core::{views, Operation, Recommendation};
//!
//! assert_eq!(Operation::QuerySearch.function_name(), "ragQuery");
//!
//! let payload = serde_json::json!([{
//!     "id": 1,
//!     "type": "video",
//!     "title": "Short explainer clips",
//!     "description": "Under 60 seconds.",
//!     "effectiveness": 72
//! }]);
//! let recs: Vec<Recommendation> = views::decode(payload).unwrap();
//! assert_eq!(recs[0].id, "1");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod operation;
pub mod views;

pub use error::{CoreError, Result};
pub use ids::{IdError, UserId};
pub use operation::{Method, Operation};
pub use views::{
    ContentAnalysis, EngagementMetrics, Recommendation, Recommendations, SearchResult,
    SearchResults, Sentiment, Tier,
};
