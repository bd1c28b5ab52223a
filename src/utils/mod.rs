//! Utility modules supporting the harvest pipeline.
//!
//! - [`HttpClient`]: shared HTTP client with configured timeouts and user agent
//! - [`RetryConfig`]: configuration for retry logic with exponential backoff
//! - [`with_retry`]: execute an operation with automatic retry on transient errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use gutendex_dataset::utils::{with_retry, RetryConfig};
//! use gutendex_dataset::sources::SourceError;
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let body = with_retry(config, || fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::{HttpClient, DEFAULT_USER_AGENT};
pub use retry::{with_retry, RetryConfig, TransientError};
