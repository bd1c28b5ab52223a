//! # Gutendex Dataset
//!
//! Collects Project Gutenberg book metadata and plaintext bodies from the
//! Gutendex API for a topic query and writes them to a CSV dataset.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (SearchQuery, ListingResult, BookRecord, etc.)
//! - [`sources`]: The `BookSource` trait and the Gutendex implementation
//! - [`harvest`]: Page traversal, per-book extraction, and the run orchestrator
//! - [`dataset`]: CSV dataset creation and row appends
//! - [`utils`]: HTTP client and retry helpers
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal progress and summary output

pub mod config;
pub mod dataset;
pub mod harvest;
pub mod models;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use dataset::Dataset;
pub use harvest::{HarvestOptions, HarvestSummary, Harvester};
pub use models::{BookRecord, SearchQuery};
pub use sources::{BookSource, GutendexSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
