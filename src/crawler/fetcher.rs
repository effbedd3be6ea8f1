//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the configured header set and timeout
//! - GET requests for HTML documents
//! - Streaming image downloads to disk
//! - The optional courtesy delay after every request

use crate::config::HttpConfig;
use crate::HarvestError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::HttpConfig;
/// use catalog_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,image/*;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Transport handle shared by every request of a run
///
/// Wraps a single `reqwest::Client` so connections are reused across the
/// homepage, listing pages, product pages and images. Requests are issued one
/// at a time; after each one the configured delay is slept, whatever the
/// outcome.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    delay: Duration,
}

impl Fetcher {
    /// Wraps an existing client
    pub fn new(client: Client, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// Builds the client and delay from the HTTP configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, HarvestError> {
        let client = build_http_client(config)?;
        Ok(Self::new(client, Duration::from_millis(config.delay_ms)))
    }

    /// The delay slept after every request
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fetches a document and returns its body as text
    ///
    /// Any transport error or non-success status is returned as an error.
    pub async fn get_text(&self, url: &Url) -> Result<String, HarvestError> {
        tracing::debug!("GET {}", url);

        let result = match self.send(url).await {
            Ok(response) => response.text().await.map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            }),
            Err(e) => Err(e),
        };

        self.pause().await;
        result
    }

    /// Streams a resource to `dest`, creating parent directories as needed
    ///
    /// The body is written to a `.part` file first and renamed into place once
    /// complete, so an interrupted download never leaves a truncated file at
    /// `dest`.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Number of bytes written
    /// * `Err(HarvestError)` - Request, status or filesystem failure
    pub async fn download(&self, url: &Url, dest: &Path) -> Result<u64, HarvestError> {
        tracing::debug!("Downloading {} -> {}", url, dest.display());

        let result = self.stream_to_file(url, dest).await;

        self.pause().await;
        result
    }

    async fn stream_to_file(&self, url: &Url, dest: &Path) -> Result<u64, HarvestError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.send(url).await?;

        let partial = dest.with_extension("part");
        match write_body(response, url, &partial, dest).await {
            Ok(written) => Ok(written),
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }

    async fn send(&self, url: &Url) -> Result<Response, HarvestError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Writes the response body to `partial`, then moves it to `dest`
async fn write_body(
    mut response: Response,
    url: &Url,
    partial: &Path,
    dest: &Path,
) -> Result<u64, HarvestError> {
    let mut file = tokio::fs::File::create(partial).await?;
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    drop(file);
    tokio::fs::rename(partial, dest).await?;

    Ok(written)
}
