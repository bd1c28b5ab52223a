//! Core data models for listing pages, books, and dataset rows.

mod book;
mod query;

pub use book::{BookRecord, BookSummary, ListingResult, Page, Person, PLAINTEXT_FORMAT};
pub use query::SearchQuery;
