//! Topic query encoding.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

/// A free-text topic filter for the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The raw topic as typed by the operator
    pub topic: String,
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    /// Form-urlencoded topic, safe to embed as a query value.
    ///
    /// Spaces become `+`; everything outside `[A-Za-z0-9*-._]` is
    /// percent-escaped. An empty topic encodes to an empty string, which the
    /// API treats as "all topics".
    pub fn encoded(&self) -> String {
        form_urlencoded::byte_serialize(self.topic.as_bytes()).collect()
    }

    /// Reverse of [`SearchQuery::encoded`]
    pub fn decode(encoded: &str) -> String {
        form_urlencoded::parse(format!("q={}", encoded).as_bytes())
            .next()
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.topic)
    }
}

impl From<&str> for SearchQuery {
    fn from(topic: &str) -> Self {
        Self::new(topic)
    }
}
