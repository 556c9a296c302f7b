//! The opaque success payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tanzania_social_core::views;

/// JSON returned by a successful call, exactly as the server sent it.
///
/// The gateway never looks inside. Callers decode the view they expect with
/// [`Payload::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Value);

impl Payload {
    /// Wrap a JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the underlying JSON.
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Decode into a typed view.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Shape` if the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> tanzania_social_core::Result<T> {
        views::decode(self.0)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        payload.0
    }
}
