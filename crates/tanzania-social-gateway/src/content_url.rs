//! Validated social-media URLs.

use std::fmt;

use reqwest::Url;
use thiserror::Error;

/// A URL rejected before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid URL {url:?}: {reason}")]
pub struct InvalidUrl {
    /// The rejected input.
    pub url: String,
    /// Why it was rejected.
    pub reason: String,
}

/// A URL accepted for content analysis.
///
/// It parses as an absolute URL and its text starts with `http://` or
/// `https://`. The original text is kept and sent unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUrl(String);

impl ContentUrl {
    /// Validate `raw`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if `raw` does not parse or uses another scheme.
    pub fn parse(raw: &str) -> Result<Self, InvalidUrl> {
        let invalid = |reason: String| InvalidUrl {
            url: raw.to_string(),
            reason,
        };

        Url::parse(raw).map_err(|e| invalid(e.to_string()))?;

        if !(raw.starts_with("http://") || raw.starts_with("https://")) {
            return Err(invalid("must start with http:// or https://".to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    /// The URL as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        for raw in [
            "https://www.instagram.com/p/Cx1yZ/",
            "http://twitter.com/user/status/1",
            "https://x.com",
        ] {
            assert_eq!(ContentUrl::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn rejects_other_schemes() {
        let err = ContentUrl::parse("ftp://bad.example").unwrap_err();
        assert_eq!(err.url, "ftp://bad.example");
        assert!(err.reason.contains("http://"));

        assert!(ContentUrl::parse("mailto:team@example.com").is_err());
        assert!(ContentUrl::parse("HTTPS://example.com").is_err());
    }

    #[test]
    fn rejects_unparseable() {
        assert!(ContentUrl::parse("invalid-url").is_err());
        assert!(ContentUrl::parse("").is_err());
        assert!(ContentUrl::parse("http://").is_err());
        assert!(ContentUrl::parse(" https://example.com").is_err());
    }
}
