//! Identifier types.
//!
//! Users are identified by the identity provider's `uid` (`localId` in the
//! REST API). It is an opaque string, not a UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a Firebase user identifier.
pub const MAX_USER_ID_LEN: usize = 128;

/// Characters that would change the meaning of a URL path segment.
const RESERVED_CHARS: [char; 4] = ['/', '?', '#', '%'];

/// An identity-provider user identifier.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Parse a `UserId`, rejecting empty or oversized values.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty, longer than
    /// [`MAX_USER_ID_LEN`] bytes, or contains `/`, `?`, `#` or `%` (it is
    /// used verbatim as a document path segment).
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.len() > MAX_USER_ID_LEN {
            return Err(IdError::TooLong {
                max: MAX_USER_ID_LEN,
                got: value.len(),
            });
        }
        if let Some(c) = value.chars().find(|c| RESERVED_CHARS.contains(c)) {
            return Err(IdError::InvalidCharacter(c));
        }
        Ok(Self(value))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is empty.
    #[error("identifier is empty")]
    Empty,

    /// The input exceeds the maximum length.
    #[error("identifier too long: max {max} bytes, got {got}")]
    TooLong {
        /// The maximum number of bytes.
        max: usize,
        /// The actual number of bytes.
        got: usize,
    },

    /// The input contains a character that is not allowed.
    #[error("identifier contains invalid character {0:?}")]
    InvalidCharacter(char),
}
