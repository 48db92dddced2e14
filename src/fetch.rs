use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::debug;

use crate::{ReviewsError, ReviewsResult};

/// Retrieves the raw CSV text for a source URL.
///
/// One attempt per call; retrying is up to the caller.
#[async_trait]
pub trait CsvFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> ReviewsResult<String>;
}

/// Fetches over HTTP(S) with caches bypassed.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (connection pool, proxy settings, timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CsvFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> ReviewsResult<String> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store, no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewsError::HttpStatus {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.text().await?;
        debug!(url, bytes = body.len(), "fetched csv");
        Ok(body)
    }
}
