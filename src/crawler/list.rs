//! Episode listing walker with windowed pagination
//!
//! A series' episodes are spread over numbered listing pages, newest first.
//! [`EpisodeListWalker`] fetches them a few pages per "load more", merging the
//! rows into one collection per series. The number of pages is estimated once
//! from the newest episode on page 1.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::PaginationConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::headers::build_page_headers;
use crate::crawler::url::ComicUrls;
use crate::models::{estimate_page_count, Episode, EpisodeListRow, PaginationState};
use crate::parser::ComicParser;
use crate::utils::decode_body;
use crate::utils::error::CrawlerError;

/// Exclusive hold on a walker's pagination for the length of one walk
pub(crate) type WalkGuard = OwnedMutexGuard<PaginationState>;

/// Episodes of one series in listing order, unique by episode index
#[derive(Debug, Clone, Default)]
pub struct EpisodeCollection {
    episodes: Vec<Episode>,
    seen: HashSet<u32>,
}

impl EpisodeCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `episode` unless its index is already present
    ///
    /// Returns `true` if the episode was added.
    pub fn merge(&mut self, episode: Episode) -> bool {
        if !self.seen.insert(episode.episode_index) {
            return false;
        }
        self.episodes.push(episode);
        true
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn contains(&self, episode_index: u32) -> bool {
        self.seen.contains(&episode_index)
    }

    pub fn as_slice(&self) -> &[Episode] {
        &self.episodes
    }
}

/// Outcome of one `load_more` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkReport {
    /// Listing pages requested and answered in this call
    pub pages_fetched: u32,
    /// Fetched pages whose episode table could not be parsed at all
    pub pages_skipped: u32,
    /// Rows dropped because they did not parse
    pub rows_skipped: usize,
    /// Episodes that were not in the collection before
    pub episodes_added: usize,
    /// Estimated page count, once page 1 has been seen
    pub upper_bound: Option<u32>,
    /// No further call will find new episodes
    pub exhausted: bool,
}

/// Rows of one listing page that parsed, plus how many did not
struct PageRows {
    rows: Vec<EpisodeListRow>,
    skipped: usize,
}

/// Walks the listing pages of one series
pub struct EpisodeListWalker {
    series_id: u32,
    fetcher: Arc<dyn Fetcher>,
    parser: ComicParser,
    urls: ComicUrls,
    pages_per_load: u32,
    episodes_per_page: u32,
    /// Held for a whole walk; doubles as the single-flight guard
    pagination: Arc<Mutex<PaginationState>>,
    /// Locked only while one page merges
    episodes: RwLock<EpisodeCollection>,
}

impl EpisodeListWalker {
    /// Create a walker positioned before page 1
    #[must_use]
    pub fn new(
        series_id: u32,
        fetcher: Arc<dyn Fetcher>,
        urls: ComicUrls,
        pagination: &PaginationConfig,
    ) -> Self {
        Self {
            series_id,
            fetcher,
            parser: ComicParser::new(),
            urls,
            pages_per_load: pagination.pages_per_load.max(1),
            episodes_per_page: pagination.episodes_per_page.max(1),
            pagination: Arc::new(Mutex::new(PaginationState::default())),
            episodes: RwLock::new(EpisodeCollection::new()),
        }
    }

    pub fn series_id(&self) -> u32 {
        self.series_id
    }

    /// Fetch up to `pages_per_load` more listing pages
    ///
    /// Pages are fetched one after another. Rows merge into the collection as
    /// each page arrives, so an error or cancellation keeps what was already
    /// merged. A page that fails to fetch is requested again by the next call;
    /// a page that fetched but does not parse is logged and passed over, and
    /// rows that do not parse are dropped from an otherwise good page.
    ///
    /// # Errors
    ///
    /// - `CrawlerError::WalkInProgress` if another call on this walker has not
    ///   returned yet
    /// - `CrawlerError::Cancelled` if `cancel` fires
    /// - `CrawlerError::Fetch` if a page cannot be fetched
    pub async fn load_more(&self, cancel: &CancellationToken) -> Result<WalkReport, CrawlerError> {
        let guard = self.try_begin()?;
        self.load_more_with(guard, cancel).await
    }

    /// Claim the single-flight guard without waiting
    pub(crate) fn try_begin(&self) -> Result<WalkGuard, CrawlerError> {
        Arc::clone(&self.pagination)
            .try_lock_owned()
            .map_err(|_| CrawlerError::WalkInProgress {
                series_id: self.series_id,
            })
    }

    /// [`load_more`](Self::load_more) with the guard already claimed
    pub(crate) async fn load_more_with(
        &self,
        mut pagination: WalkGuard,
        cancel: &CancellationToken,
    ) -> Result<WalkReport, CrawlerError> {
        let mut report = WalkReport::default();

        if !pagination.exhausted {
            self.walk(&mut *pagination, cancel, &mut report).await?;
        }

        report.upper_bound = pagination.upper_bound;
        report.exhausted = pagination.exhausted;

        let total = self.episodes.read().await.len();
        tracing::info!(
            series_id = self.series_id,
            pages_fetched = report.pages_fetched,
            pages_skipped = report.pages_skipped,
            rows_skipped = report.rows_skipped,
            episodes_added = report.episodes_added,
            total = total,
            exhausted = report.exhausted,
            "Completed episode load"
        );

        Ok(report)
    }

    async fn walk(
        &self,
        pagination: &mut PaginationState,
        cancel: &CancellationToken,
        report: &mut WalkReport,
    ) -> Result<(), CrawlerError> {
        for _ in 0..self.pages_per_load {
            if pagination.past_window() {
                tracing::debug!(
                    series_id = self.series_id,
                    next_page = pagination.next_page,
                    upper_bound = ?pagination.upper_bound,
                    "Reached estimated page count"
                );
                pagination.exhausted = true;
                break;
            }

            if cancel.is_cancelled() {
                return Err(CrawlerError::Cancelled);
            }

            let page = pagination.next_page;
            let page_rows = match self.fetch_page(page, cancel).await {
                Ok(page_rows) => page_rows,
                Err(CrawlerError::Parse(e)) if e.is_end_of_listing() => {
                    tracing::debug!(series_id = self.series_id, page, "No more episode rows");
                    report.pages_fetched += 1;
                    pagination.exhausted = true;
                    break;
                }
                Err(CrawlerError::Parse(e)) => {
                    tracing::warn!(
                        series_id = self.series_id,
                        page,
                        error = %e,
                        "Skipping unparsable listing page"
                    );
                    report.pages_fetched += 1;
                    report.pages_skipped += 1;
                    pagination.next_page = page + 1;
                    continue;
                }
                Err(CrawlerError::Cancelled) => return Err(CrawlerError::Cancelled),
                Err(e) => {
                    tracing::warn!(
                        series_id = self.series_id,
                        page,
                        error = %e,
                        "Listing page failed"
                    );
                    return Err(e);
                }
            };
            report.pages_fetched += 1;
            report.rows_skipped += page_rows.skipped;
            pagination.next_page = page + 1;

            // Later pages hold older episodes and would underestimate the count
            if page == 1 && pagination.upper_bound.is_none() {
                if let Some(newest) = page_rows.rows.iter().map(|r| r.episode_index).max() {
                    let bound = estimate_page_count(newest, self.episodes_per_page);
                    tracing::debug!(
                        series_id = self.series_id,
                        newest,
                        upper_bound = bound,
                        "Estimated page count"
                    );
                    pagination.upper_bound = Some(bound);
                    pagination.window_end = bound;
                }
            }

            if page_rows.rows.is_empty() {
                continue;
            }

            let row_count = page_rows.rows.len();
            let (added, total) = {
                let mut episodes = self.episodes.write().await;
                let mut added = 0;
                for row in page_rows.rows {
                    if episodes.merge(Episode::from_row(self.series_id, row)) {
                        added += 1;
                    }
                }
                (added, episodes.len())
            };
            report.episodes_added += added;

            tracing::debug!(
                series_id = self.series_id,
                page,
                rows = row_count,
                episodes_added = added,
                total,
                "Processed listing page"
            );

            // The site answers out-of-range pages with its last page again
            if added == 0 {
                pagination.exhausted = true;
                break;
            }
        }

        if pagination.past_window() {
            pagination.exhausted = true;
        }

        Ok(())
    }

    async fn fetch_page(
        &self,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<PageRows, CrawlerError> {
        let url = self.urls.list_page(self.series_id, page);

        tracing::debug!(series_id = self.series_id, page, url = %url, "Fetching listing page");

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CrawlerError::Cancelled),
            body = self.fetcher.fetch(&url, build_page_headers(&url)) => body?,
        };

        let html = decode_body(&body);
        let mut page_rows = PageRows {
            rows: Vec::new(),
            skipped: 0,
        };
        for row in self.parser.parse_episode_rows(&html)? {
            match row {
                Ok(row) => page_rows.rows.push(row),
                Err(e) => {
                    tracing::warn!(
                        series_id = self.series_id,
                        page,
                        error = %e,
                        "Skipping unparsable episode row"
                    );
                    page_rows.skipped += 1;
                }
            }
        }
        Ok(page_rows)
    }

    /// Snapshot of the episodes loaded so far, in listing order
    ///
    /// Does not wait for a running walk; pages merged so far are included.
    pub async fn episodes(&self) -> Vec<Episode> {
        self.episodes.read().await.as_slice().to_vec()
    }

    /// Current pagination position
    ///
    /// Waits for a running walk to finish.
    pub async fn pagination(&self) -> PaginationState {
        *self.pagination.lock().await
    }
}
