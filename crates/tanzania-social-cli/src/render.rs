//! Plain-text rendering of dashboard views and errors.

use tanzania_social_core::{ContentAnalysis, Recommendation, SearchResult};
use tanzania_social_gateway::{DashboardError, GatewayError};

/// Characters of passage text shown per search result.
const EXCERPT_CHARS: usize = 200;

/// Render search results, best first as returned by the backend.
pub fn search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut lines = Vec::with_capacity(results.len() * 3);
    for (i, result) in results.iter().enumerate() {
        let date = result
            .timestamp
            .map_or_else(|| "unknown date".to_string(), |ts| ts.format("%Y-%m-%d").to_string());
        lines.push(format!(
            "{}. [{}] {} confidence | {} | {}",
            i + 1,
            result.tier().as_str(),
            result.confidence_percent(),
            result.source,
            date
        ));

        let excerpt = result.excerpt(EXCERPT_CHARS);
        if excerpt.len() < result.content.len() {
            lines.push(format!("   {excerpt}..."));
        } else {
            lines.push(format!("   {excerpt}"));
        }
        lines.push(String::new());
    }
    lines.pop();
    lines.join("\n")
}

/// Render a content analysis.
pub fn analysis(analysis: &ContentAnalysis) -> String {
    let metrics = &analysis.metrics;
    [
        "Engagement".to_string(),
        format!("  Likes:    {}", metrics.likes),
        format!("  Comments: {}", metrics.comments),
        format!("  Shares:   {}", metrics.shares),
        format!(
            "  Rate:     {:.1}% ({})",
            analysis.engagement_rate * 100.0,
            analysis.engagement_tier().as_str()
        ),
        "Sentiment".to_string(),
        format!(
            "  {} ({:.0}% confidence, {})",
            analysis.sentiment.label,
            analysis.sentiment.confidence * 100.0,
            analysis.sentiment.tier().as_str()
        ),
    ]
    .join("\n")
}

/// Render recommendations.
pub fn recommendations(recs: &[Recommendation]) -> String {
    if recs.is_empty() {
        return "No recommendations yet.".to_string();
    }

    let mut lines = Vec::new();
    for rec in recs {
        lines.push(format!(
            "* {} [{}] {:.0}% effective ({})",
            rec.title,
            rec.kind,
            rec.effectiveness,
            rec.tier().as_str()
        ));
        lines.push(format!("  {}", rec.description));
        if let Some(example) = &rec.example {
            lines.push(format!("  Example: {example}"));
        }
    }
    lines.join("\n")
}

/// Render the recent query list.
pub fn history(queries: &[String]) -> String {
    if queries.is_empty() {
        return "No recent searches.".to_string();
    }

    queries
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {q}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The message shown to the user for a failed command.
pub fn error_message(err: &DashboardError) -> String {
    match err {
        DashboardError::EmptyQuery => "Please enter a search query.".to_string(),
        DashboardError::InvalidUrl(_) => {
            "Please enter a valid URL starting with http:// or https://".to_string()
        }
        DashboardError::Gateway(GatewayError::Unauthenticated) => {
            "You are not signed in. Pass --id-token, --refresh-token or --email and --password."
                .to_string()
        }
        DashboardError::Gateway(GatewayError::AuthTokenError(reason)) => {
            format!("Your session could not be verified ({reason}). Please sign in again.")
        }
        DashboardError::Gateway(GatewayError::RemoteError(message)) => message.clone(),
        DashboardError::Gateway(GatewayError::ServiceUnavailable(_)) => {
            "The service is unavailable. Check your connection and try again.".to_string()
        }
        DashboardError::Shape(e) => format!("The service returned an unexpected response: {e}"),
    }
}
