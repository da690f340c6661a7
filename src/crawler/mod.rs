//! Scraping core for Naver Comic
//!
//! This module fetches listing pages, viewer pages, images and the comment API,
//! and turns them into series, episodes, strip images and best comments.
//! [`Crawler`] is the entry point the session and the CLI drive.

pub mod comment;
pub mod fetcher;
pub mod headers;
pub mod image;
pub mod list;
pub mod url;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::models::{Comment, Episode, Series};
use crate::parser::ComicParser;
use crate::utils::decode_body;
use crate::utils::error::{CrawlerError, FetchError};

use self::comment::CommentDecoder;
use self::fetcher::{Fetcher, HttpFetcher};
use self::headers::{build_comment_headers, build_page_headers};
use self::image::ImageLoader;
use self::list::{EpisodeListWalker, WalkGuard, WalkReport};
use self::url::ComicUrls;

/// Main crawler structure
pub struct Crawler {
    /// Configuration
    config: Config,

    /// Network access, shared with walkers and the image loader
    fetcher: Arc<dyn Fetcher>,

    parser: ComicParser,
    urls: ComicUrls,
    decoder: CommentDecoder,
    images: ImageLoader,

    /// One listing walker per series, created on first use
    walkers: RwLock<HashMap<u32, Arc<EpisodeListWalker>>>,
}

impl Crawler {
    /// Create a crawler that talks to the network through `fetcher`
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let urls = ComicUrls::from_config(&config.endpoints).context("Invalid endpoints")?;
        let images = ImageLoader::new(Arc::clone(&fetcher), config.client.max_concurrent_images);

        Ok(Self {
            decoder: CommentDecoder::new(config.comments.framing),
            parser: ComicParser::new(),
            urls,
            images,
            fetcher,
            walkers: RwLock::new(HashMap::new()),
            config,
        })
    }

    /// Create a crawler backed by [`HttpFetcher`]
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config).context("Failed to create HTTP client")?;
        Self::new(config, Arc::new(fetcher))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Look up a series by id: title from its first listing page, then the
    /// thumbnail image
    ///
    /// # Errors
    ///
    /// Fails if either request fails or the listing page lost its header
    /// block.
    pub async fn load_series(&self, series_id: u32) -> Result<Series, CrawlerError> {
        let html = self.fetch_page(&self.urls.list_page(series_id, 1)).await?;
        let metadata = self.parser.parse_series_metadata(&html)?;

        let thumbnail = self.images.fetch_one(&metadata.thumbnail_url).await?;

        tracing::info!(series_id, title = %metadata.title, "Loaded series");
        Ok(Series::new(series_id, metadata.title, thumbnail))
    }

    /// Load the next window of listing pages of a series
    ///
    /// See [`EpisodeListWalker::load_more`].
    pub async fn load_more_episodes(
        &self,
        series_id: u32,
        cancel: &CancellationToken,
    ) -> Result<WalkReport, CrawlerError> {
        let (walker, guard) = self.begin_walk(series_id).await?;
        walker.load_more_with(guard, cancel).await
    }

    /// Episodes of a series loaded so far, newest first
    pub async fn episodes(&self, series_id: u32) -> Vec<Episode> {
        let walker = self.walkers.read().await.get(&series_id).cloned();
        match walker {
            Some(walker) => walker.episodes().await,
            None => Vec::new(),
        }
    }

    /// Drop the listing state of a series
    ///
    /// Returns `false` if nothing was loaded for the series.
    ///
    /// # Errors
    ///
    /// Returns `CrawlerError::WalkInProgress` while the series is loading.
    pub async fn forget_series(&self, series_id: u32) -> Result<bool, CrawlerError> {
        let mut walkers = self.walkers.write().await;
        let Some(walker) = walkers.get(&series_id) else {
            return Ok(false);
        };

        let _guard = walker.try_begin()?;
        walkers.remove(&series_id);

        tracing::debug!(series_id, "Forgot series listing");
        Ok(true)
    }

    /// Strip image URLs of an episode, in reading order
    pub async fn episode_images(
        &self,
        series_id: u32,
        episode_index: u32,
    ) -> Result<Vec<String>, CrawlerError> {
        let html = self
            .fetch_page(&self.urls.viewer_page(series_id, episode_index))
            .await?;
        let images = self.parser.parse_episode_images(&html)?;

        tracing::debug!(series_id, episode_index, images = images.len(), "Parsed viewer page");
        Ok(images)
    }

    /// Download images concurrently; see [`ImageLoader::fetch_all`]
    pub async fn fetch_images(
        &self,
        urls: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Result<Bytes, FetchError>>, CrawlerError> {
        self.images.fetch_all(urls, cancel).await
    }

    /// Best comments of an episode, in the order the API lists them
    pub async fn best_comments(
        &self,
        series_id: u32,
        episode_index: u32,
    ) -> Result<Vec<Comment>, CrawlerError> {
        let url = self
            .urls
            .comment_api(series_id, episode_index, self.config.comments.page_size);
        let referer = self.urls.comment_page(series_id, episode_index);

        tracing::debug!(series_id, episode_index, url = %url, "Fetching comments");

        let body = self.fetcher.fetch(&url, build_comment_headers(&referer)).await?;
        let comments = self.decoder.decode(&body)?;

        tracing::info!(series_id, episode_index, best = comments.len(), "Loaded best comments");
        Ok(comments)
    }

    /// Find or create the walker of a series and claim its single-flight
    /// guard
    ///
    /// The guard is claimed while the map lock is held, so `forget_series`
    /// cannot drop a walker between lookup and claim.
    async fn begin_walk(
        &self,
        series_id: u32,
    ) -> Result<(Arc<EpisodeListWalker>, WalkGuard), CrawlerError> {
        {
            let walkers = self.walkers.read().await;
            if let Some(walker) = walkers.get(&series_id) {
                let guard = walker.try_begin()?;
                return Ok((Arc::clone(walker), guard));
            }
        }

        let mut walkers = self.walkers.write().await;
        let walker = walkers.entry(series_id).or_insert_with(|| {
            Arc::new(EpisodeListWalker::new(
                series_id,
                Arc::clone(&self.fetcher),
                self.urls.clone(),
                &self.config.pagination,
            ))
        });
        let guard = walker.try_begin()?;
        Ok((Arc::clone(walker), guard))
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let body = self.fetcher.fetch(url, build_page_headers(url)).await?;
        Ok(decode_body(&body))
    }
}
