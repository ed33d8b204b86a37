//! HTTP client wrapper shared by the crawler and downloader.
//!
//! One pooled `reqwest::Client` is built at startup and reused for every
//! listing request and file download.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::error::DownloadError;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// HTTP client for listing requests and streaming file downloads.
///
/// Designed to be created once and cloned into every branch, taking
/// advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Issues a GET request and verifies the response status.
    ///
    /// The response body is untouched so callers can stream it.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Timeout`] or [`DownloadError::Network`] if
    /// the request fails, and [`DownloadError::HttpStatus`] for non-success
    /// responses.
    pub async fn get(&self, url: &Url) -> Result<reqwest::Response, DownloadError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url.as_str())
            } else {
                DownloadError::network(url.as_str(), e)
            }
        })?;

        if !response.status().is_success() {
            return Err(DownloadError::http_status(
                url.as_str(),
                response.status().as_u16(),
            ));
        }

        Ok(response)
    }

    /// Returns the underlying pooled client for request shapes the wrapper
    /// does not cover (the JSON listing backend's POST exchange).
    pub(crate) fn inner(&self) -> &Client {
        &self.client
    }
}
