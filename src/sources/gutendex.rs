//! Gutendex (Project Gutenberg JSON API) source implementation.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};

use crate::config::{ApiConfig, RetrySettings};
use crate::models::{ListingResult, SearchQuery};
use crate::sources::{BookSource, SourceError};
use crate::utils::{with_retry, HttpClient, RetryConfig};

pub const GUTENDEX_API_BASE: &str = "https://gutendex.com";

/// Gutendex source
///
/// Listing pages come from `<base>/books/?topic=<query>`; each page links to
/// the next through its `next` field. Plaintext bodies are served by
/// gutenberg.org mirrors referenced from the `formats` map.
#[derive(Debug, Clone)]
pub struct GutendexSource {
    client: HttpClient,
    base_url: String,
    retry: RetryConfig,
}

impl GutendexSource {
    /// Create a new Gutendex source against the public API
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(HttpClient::new()?, GUTENDEX_API_BASE))
    }

    /// Create a source against another API root (a mirror or a test server)
    pub fn with_client(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryConfig::no_retry(),
        }
    }

    /// Build a source from configuration
    pub fn from_config(api: &ApiConfig, retry: &RetrySettings) -> Result<Self, SourceError> {
        let client = HttpClient::from_config(api)?;
        Ok(Self::with_client(client, &api.base_url).with_retry(retry.to_retry_config()))
    }

    /// Set the retry policy applied to every request
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, url: &str) -> Result<Response, SourceError> {
        let response = self
            .client
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Network(format!("Request to {} timed out", url))
                } else {
                    SourceError::Network(format!("Failed to fetch {}: {}", url, e))
                }
            })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::TOO_MANY_REQUESTS => Err(SourceError::RateLimit),
            status => Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

#[async_trait]
impl BookSource for GutendexSource {
    fn name(&self) -> &str {
        "Gutendex"
    }

    fn listing_url(&self, query: &SearchQuery) -> String {
        format!("{}/books/?topic={}", self.base_url, query.encoded())
    }

    async fn fetch_listing(&self, url: &str) -> Result<ListingResult, SourceError> {
        tracing::debug!("Fetching listing page {}", url);

        with_retry(self.retry, || async move {
            let body = self
                .get(url)
                .await?
                .bytes()
                .await
                .map_err(|e| SourceError::Network(format!("Failed to read {}: {}", url, e)))?;

            serde_json::from_slice::<ListingResult>(&body)
                .map_err(|e| SourceError::Parse(format!("Invalid listing at {}: {}", url, e)))
        })
        .await
    }

    async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
        tracing::debug!("Fetching plaintext {}", url);

        let bytes = with_retry(self.retry, || async move {
            self.get(url)
                .await?
                .bytes()
                .await
                .map_err(|e| SourceError::Network(format!("Failed to read {}: {}", url, e)))
        })
        .await?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
