//! Book catalogue sources.
//!
//! The harvest pipeline only talks to a [`BookSource`]: it asks for listing
//! pages by URL and for the plaintext body of a book by URL. The production
//! implementation is [`GutendexSource`]; [`MockSource`] serves canned pages
//! for tests.
//!
//! # Implementing a New Source
//!
//! 1. Create a struct that implements `BookSource`
//! 2. Build the first listing URL in `listing_url`
//! 3. Return `ListingResult` pages whose `next` links form a finite chain

mod gutendex;
pub mod mock;

pub use gutendex::{GutendexSource, GUTENDEX_API_BASE};
pub use mock::MockSource;

use crate::models::{ListingResult, SearchQuery};
use async_trait::async_trait;

/// Interface for a paginated book catalogue with plaintext downloads.
#[async_trait]
pub trait BookSource: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// URL of the first listing page for a topic
    fn listing_url(&self, query: &SearchQuery) -> String;

    /// Fetch and parse one listing page
    async fn fetch_listing(&self, url: &str) -> Result<ListingResult, SourceError>;

    /// Fetch the body behind a download URL as text
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or transport error
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Parsing error (JSON body)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl SourceError {
    /// True for 5xx responses
    pub fn is_server_error(&self) -> bool {
        matches!(self, SourceError::Status { status, .. } if *status >= 500)
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = SourceError::Status {
            status: 503,
            url: "https://gutendex.com/books/".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from https://gutendex.com/books/");
        assert!(err.is_server_error());
    }

    #[test]
    fn test_json_error_is_parse() {
        let err: SourceError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, SourceError::Parse(_)));
        assert!(!err.is_server_error());
    }
}
