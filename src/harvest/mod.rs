//! The collection pipeline.
//!
//! [`Harvester::run`] creates the dataset, walks the listing pages lazily,
//! and for every listed book extracts a record and appends it. Page-level
//! failures abort the run; book-level failures are collected in the
//! [`HarvestSummary`] and the run moves on.
//!
//! ```rust,no_run
//! use gutendex_dataset::harvest::{HarvestOptions, Harvester};
//! use gutendex_dataset::models::SearchQuery;
//! use gutendex_dataset::sources::GutendexSource;
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let harvester = Harvester::new(GutendexSource::new()?, HarvestOptions::default());
//! let summary = harvester
//!     .run(&SearchQuery::new("science fiction"), Path::new("/tmp/sci-fi-books.csv"))
//!     .await?;
//! println!("{} books written", summary.written);
//! # Ok(())
//! # }
//! ```

mod extract;
mod pages;

pub use extract::{extract_record, process_item, FailureKind, ItemFailure};
pub use pages::{collect_page_urls, pages};

use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::HarvestConfig;
use crate::dataset::{Dataset, DatasetError};
use crate::models::SearchQuery;
use crate::sources::{BookSource, SourceError};
use crate::ui::HarvestProgress;

/// Run-level options
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    /// Pause after each written record
    pub delay: Duration,

    /// Stop after this many listing pages
    pub max_pages: Option<usize>,

    /// Suppress the terminal spinner
    pub quiet: bool,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self::from(&HarvestConfig::default())
    }
}

impl From<&HarvestConfig> for HarvestOptions {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            delay: config.delay(),
            max_pages: config.max_pages,
            quiet: false,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Default)]
pub struct HarvestSummary {
    /// Listing pages walked
    pub pages: usize,

    /// Rows appended to the dataset
    pub written: usize,

    /// Total matches reported by the API on the first page
    pub total_reported: Option<u64>,

    /// Items that produced no row, in listing order
    pub failures: Vec<ItemFailure>,
}

impl HarvestSummary {
    /// Items looked at, written or not
    pub fn processed(&self) -> usize {
        self.written + self.failures.len()
    }
}

/// Errors that abort a run
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Failed to fetch listing: {0}")]
    Source(#[from] SourceError),
}

/// Sequences one collection run against a [`BookSource`]
#[derive(Debug)]
pub struct Harvester<S> {
    source: S,
    options: HarvestOptions,
}

impl<S: BookSource> Harvester<S> {
    pub fn new(source: S, options: HarvestOptions) -> Self {
        Self { source, options }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collect every book matching `query` into a fresh dataset at `csv_path`.
    ///
    /// The dataset is created (truncated) before the first request, so an
    /// aborted run leaves a valid header plus whatever rows were written.
    pub async fn run(
        &self,
        query: &SearchQuery,
        csv_path: &Path,
    ) -> Result<HarvestSummary, HarvestError> {
        let dataset = Dataset::create(csv_path)?;
        let first_url = self.source.listing_url(query);

        tracing::info!(
            "Collecting books for topic '{}' from {} into {}",
            query,
            self.source.name(),
            dataset.path().display()
        );

        let progress = HarvestProgress::new(self.options.quiet);
        let mut summary = HarvestSummary::default();

        let pages = pages(&self.source, first_url, self.options.max_pages);
        futures_util::pin_mut!(pages);

        while let Some(page) = pages.next().await {
            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    progress.finish();
                    tracing::error!(
                        "Stopping after {} pages and {} books: {}",
                        summary.pages,
                        summary.written,
                        e
                    );
                    return Err(e.into());
                }
            };

            summary.pages += 1;
            if summary.pages == 1 {
                summary.total_reported = page.listing.count;
                if let Some(count) = page.listing.count {
                    tracing::info!("{} books match '{}'", count, query);
                }
            }

            tracing::info!("Processing page {}: {}", page.number, page.url);
            progress.page(page.number);

            for item in &page.listing.results {
                match process_item(&self.source, &dataset, item).await {
                    Ok(record) => {
                        summary.written += 1;
                        progress.saved(&record);

                        if !self.options.delay.is_zero() {
                            sleep(self.options.delay).await;
                        }
                    }
                    Err(failure) => {
                        tracing::warn!("Skipped {}", failure);
                        summary.failures.push(failure);
                    }
                }
            }
        }

        progress.finish();
        tracing::info!(
            "Finished: {} pages, {} books written, {} skipped",
            summary.pages,
            summary.written,
            summary.failures.len()
        );

        Ok(summary)
    }
}
