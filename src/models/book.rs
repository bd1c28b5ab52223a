//! Book models: listing pages, per-item summaries, and the persisted record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Content-type label of the plaintext rendition used for the `text` column.
pub const PLAINTEXT_FORMAT: &str = "text/plain; charset=us-ascii";

/// Parsed body of one listing page.
///
/// Items are kept as raw JSON so that one malformed entry only fails its own
/// extraction, never the whole page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingResult {
    /// Total number of matching books reported by the API
    #[serde(default)]
    pub count: Option<u64>,

    /// URL of the following page, `None` on the last page
    #[serde(default)]
    pub next: Option<String>,

    /// Items on this page, in API order
    pub results: Vec<serde_json::Value>,
}

impl ListingResult {
    /// Returns true when this is the last page of the chain
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// One page of the listing chain: where it was fetched from and what it held.
#[derive(Debug, Clone)]
pub struct Page {
    /// Absolute URL the page was fetched from
    pub url: String,

    /// 1-based position in the chain
    pub number: usize,

    /// Parsed body
    pub listing: ListingResult,
}

/// A person credited on a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,

    #[serde(default)]
    pub birth_year: Option<i32>,

    #[serde(default)]
    pub death_year: Option<i32>,
}

/// A book as it appears inside a listing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSummary {
    /// Project Gutenberg identifier
    pub id: u64,

    pub title: String,

    /// Authors in credit order
    pub authors: Vec<Person>,

    /// Content-type label to download URL
    #[serde(default)]
    pub formats: HashMap<String, String>,
}

impl BookSummary {
    /// Name of the first credited author
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(|a| a.name.as_str())
    }

    /// Download URL of the plaintext rendition, if the book has one
    pub fn plaintext_url(&self) -> Option<&str> {
        self.formats.get(PLAINTEXT_FORMAT).map(String::as_str)
    }
}

/// One row of the output dataset.
///
/// Field order matches the dataset header: `id,title,author,text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub text: String,
}

impl BookRecord {
    pub fn new(
        id: u64,
        title: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_parses_gutendex_page() {
        let body = json!({
            "count": 2,
            "next": "https://gutendex.com/books/?page=2&topic=astronomy",
            "previous": null,
            "results": [{"id": 1}, {"id": 2}]
        });

        let listing: ListingResult = serde_json::from_value(body).unwrap();
        assert_eq!(listing.count, Some(2));
        assert_eq!(listing.results.len(), 2);
        assert!(!listing.is_last());
    }

    #[test]
    fn test_listing_null_next_is_last() {
        let listing: ListingResult =
            serde_json::from_value(json!({"next": null, "results": []})).unwrap();
        assert!(listing.is_last());
    }

    #[test]
    fn test_listing_requires_results() {
        let parsed = serde_json::from_value::<ListingResult>(json!({"next": null}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_summary_lookups() {
        let summary: BookSummary = serde_json::from_value(json!({
            "id": 84,
            "title": "Frankenstein",
            "authors": [
                {"name": "Shelley, Mary Wollstonecraft", "birth_year": 1797, "death_year": 1851}
            ],
            "formats": {
                "text/plain; charset=us-ascii": "https://www.gutenberg.org/files/84/84-0.txt",
                "text/html": "https://www.gutenberg.org/ebooks/84.html.images"
            }
        }))
        .unwrap();

        assert_eq!(summary.first_author(), Some("Shelley, Mary Wollstonecraft"));
        assert_eq!(
            summary.plaintext_url(),
            Some("https://www.gutenberg.org/files/84/84-0.txt")
        );
    }

    #[test]
    fn test_summary_without_plaintext() {
        let summary: BookSummary = serde_json::from_value(json!({
            "id": 7,
            "title": "Audio only",
            "authors": [],
            "formats": {"audio/mpeg": "https://example.com/7.mp3"}
        }))
        .unwrap();

        assert!(summary.plaintext_url().is_none());
        assert!(summary.first_author().is_none());
    }
}
