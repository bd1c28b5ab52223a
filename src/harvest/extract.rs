//! Per-item record extraction.
//!
//! Every listed item is handled on its own: whatever goes wrong with one book
//! is reported as an [`ItemFailure`] and never affects the next one.

use serde_json::Value;
use std::fmt;

use crate::dataset::{Dataset, DatasetError};
use crate::models::{BookRecord, BookSummary, PLAINTEXT_FORMAT};
use crate::sources::{BookSource, SourceError};

/// Why a single item produced no row
#[derive(Debug, thiserror::Error)]
pub enum FailureKind {
    /// The item is missing `id`, `title`, `authors`, or a first author
    #[error("malformed item: {0}")]
    Malformed(String),

    /// The item has no `text/plain; charset=us-ascii` download
    #[error("no plaintext version available ('{}')", PLAINTEXT_FORMAT)]
    MissingPlaintext,

    /// Downloading the body failed
    #[error("failed to fetch text: {0}")]
    Fetch(#[source] SourceError),

    /// Appending the row failed
    #[error("failed to write row: {0}")]
    Write(#[source] DatasetError),
}

/// A failed item together with the identifier it was listed under
#[derive(Debug)]
pub struct ItemFailure {
    /// `None` when the item did not even carry a numeric id
    pub id: Option<u64>,
    pub kind: FailureKind,
}

impl ItemFailure {
    pub fn new(id: Option<u64>, kind: FailureKind) -> Self {
        Self { id, kind }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "book {}: {}", id, self.kind),
            None => write!(f, "book <no id>: {}", self.kind),
        }
    }
}

impl std::error::Error for ItemFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Turn one raw listing item into a record, downloading its plaintext body.
pub async fn extract_record<S>(source: &S, item: &Value) -> Result<BookRecord, ItemFailure>
where
    S: BookSource + ?Sized,
{
    let id = item.get("id").and_then(Value::as_u64);

    let summary: BookSummary = serde_json::from_value(item.clone())
        .map_err(|e| ItemFailure::new(id, FailureKind::Malformed(e.to_string())))?;

    let author = summary
        .first_author()
        .ok_or_else(|| {
            ItemFailure::new(
                Some(summary.id),
                FailureKind::Malformed("no authors listed".to_string()),
            )
        })?
        .to_string();

    tracing::info!(
        "ID: {} | Title: {} | Author: {}",
        summary.id,
        summary.title,
        author
    );

    let url = summary
        .plaintext_url()
        .ok_or_else(|| ItemFailure::new(Some(summary.id), FailureKind::MissingPlaintext))?;

    let text = source
        .fetch_text(url)
        .await
        .map_err(|e| ItemFailure::new(Some(summary.id), FailureKind::Fetch(e)))?;

    Ok(BookRecord::new(summary.id, summary.title, author, text))
}

/// Extract one item and append it to `dataset`.
pub async fn process_item<S>(
    source: &S,
    dataset: &Dataset,
    item: &Value,
) -> Result<BookRecord, ItemFailure>
where
    S: BookSource + ?Sized,
{
    let record = extract_record(source, item).await?;

    dataset
        .append(&record)
        .map_err(|e| ItemFailure::new(Some(record.id), FailureKind::Write(e)))?;

    Ok(record)
}
