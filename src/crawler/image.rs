//! Concurrent strip image downloads

use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::crawler::fetcher::Fetcher;
use crate::crawler::headers::build_image_headers;
use crate::utils::error::{CrawlerError, FetchError};

/// Downloads images with a bound on requests in flight
pub struct ImageLoader {
    fetcher: Arc<dyn Fetcher>,
    semaphore: Semaphore,
}

impl ImageLoader {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            semaphore: Semaphore::new(max_concurrent.max(1)),
        }
    }

    /// Fetch one image with its own URL as referer
    pub async fn fetch_one(&self, url: &str) -> Result<Bytes, FetchError> {
        self.fetcher.fetch(url, build_image_headers(url)).await
    }

    /// Fetch every URL, one result per URL in input order
    ///
    /// A failing image does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns `CrawlerError::Cancelled` if `cancel` fires before all images
    /// are in.
    pub async fn fetch_all(
        &self,
        urls: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Result<Bytes, FetchError>>, CrawlerError> {
        let downloads = urls.iter().map(|url| async move {
            let _permit = self.semaphore.acquire().await;
            let result = self.fetch_one(url).await;
            if let Err(e) = &result {
                tracing::warn!(url = %url, error = %e, "Image fetch failed");
            }
            result
        });

        let results = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CrawlerError::Cancelled),
            results = join_all(downloads) => results,
        };

        tracing::debug!(
            images = results.len(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "Fetched images"
        );

        Ok(results)
    }
}
