//! Mock source for testing purposes.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{ListingResult, SearchQuery, PLAINTEXT_FORMAT};
use crate::sources::{BookSource, SourceError};

/// Base URL used for every page and body served by [`MockSource`]
pub const MOCK_BASE: &str = "mock://books";

/// A mock source that serves predefined listing pages and book bodies.
///
/// URLs that were never registered fail with a network error, which lets
/// tests simulate outages for a single page or a single book.
#[derive(Debug, Default)]
pub struct MockSource {
    pages: Mutex<HashMap<String, ListingResult>>,
    texts: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `listing` at `url`.
    pub fn set_page(&self, url: impl Into<String>, listing: ListingResult) {
        self.pages.lock().unwrap().insert(url.into(), listing);
    }

    /// Serve `text` at `url`.
    pub fn set_text(&self, url: impl Into<String>, text: impl Into<String>) {
        self.texts.lock().unwrap().insert(url.into(), text.into());
    }

    /// Every URL requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of times `url` was requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    fn record(&self, url: &str) {
        self.requests.lock().unwrap().push(url.to_string());
    }
}

#[async_trait]
impl BookSource for MockSource {
    fn name(&self) -> &str {
        "Mock Source"
    }

    fn listing_url(&self, query: &SearchQuery) -> String {
        format!("{}/?topic={}", MOCK_BASE, query.encoded())
    }

    async fn fetch_listing(&self, url: &str) -> Result<ListingResult, SourceError> {
        self.record(url);
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::Network(format!("no page at {}", url)))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
        self.record(url);
        self.texts
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::Network(format!("no body at {}", url)))
    }
}

/// Helper to build a Gutendex-shaped item with a plaintext format.
pub fn make_book(id: u64, title: &str, author: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "authors": [{"name": author}],
        "formats": {
            PLAINTEXT_FORMAT: text_url(id),
            "text/html": format!("{}/{}.html", MOCK_BASE, id)
        }
    })
}

/// Helper to build a Gutendex-shaped item with no plaintext format.
pub fn make_book_without_text(id: u64, title: &str, author: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "authors": [{"name": author}],
        "formats": {"application/epub+zip": format!("{}/{}.epub", MOCK_BASE, id)}
    })
}

/// Plaintext URL [`make_book`] assigns to a book id.
pub fn text_url(id: u64) -> String {
    format!("{}/{}.txt", MOCK_BASE, id)
}

/// Helper to build a listing page.
pub fn make_listing(results: Vec<serde_json::Value>, next: Option<&str>) -> ListingResult {
    ListingResult {
        count: None,
        next: next.map(str::to_string),
        results,
    }
}
