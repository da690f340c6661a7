//! HTTP fetcher for Naver Comic pages, images and the comment API
//!
//! The [`Fetcher`] trait is the crawler's only door to the network. Walkers and
//! the crawler facade hold an `Arc<dyn Fetcher>`, so tests swap in scripted
//! fetchers while [`HttpFetcher`] does the real work with reqwest.
//!
//! Every request is a single attempt: callers decide whether a recoverable
//! error (see [`FetchError::is_recoverable`]) is worth another try.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Client;

use crate::config::Config;
use crate::utils::error::FetchError;

/// Fetch one URL and hand back the raw body
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` with `headers`
    ///
    /// # Errors
    ///
    /// - `FetchError::HttpStatus` for any non-2xx status
    /// - `FetchError::EmptyBody` for a 2xx response without content
    /// - `FetchError::Timeout` / `FetchError::Network` for transport failures
    /// - `FetchError::InvalidUrl` if `url` does not parse
    async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<Bytes, FetchError>;
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher from the client section of the configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Self::with_timeout(&config.client.user_agent, config.request_timeout())
    }

    /// Create a fetcher with an explicit user agent and timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the HTTP client cannot be created
    pub fn with_timeout(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<Bytes, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        tracing::debug!(url, "Fetching");

        let response = self
            .client
            .get(parsed)
            .headers(headers)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "Non-success status");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        tracing::debug!(url, bytes = body.len(), "Fetched");
        Ok(body)
    }
}

fn classify(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(error)
    }
}
