// Core data structures for the toonview session

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A subscribed webtoon series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub thumbnail: Bytes,
    pub title: String,
    pub series_id: u32,
    pub user_note: String,
    pub last_read_episode: u32,
}

impl Series {
    /// Create a freshly added series with nothing read yet
    pub fn new(series_id: u32, title: impl Into<String>, thumbnail: Bytes) -> Self {
        Self {
            thumbnail,
            title: title.into(),
            series_id,
            user_note: String::new(),
            last_read_episode: 0,
        }
    }

    /// Record that `episode_index` was read; never moves backwards
    ///
    /// Returns `true` if the stored position changed.
    pub fn mark_read(&mut self, episode_index: u32) -> bool {
        if episode_index > self.last_read_episode {
            self.last_read_episode = episode_index;
            true
        } else {
            false
        }
    }
}

/// One published installment of a series
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Episode {
    pub thumbnail_url: String,
    pub title: String,
    pub series_id: u32,
    pub episode_index: u32,
}

impl Episode {
    /// Bind a parsed listing row to its series
    pub fn from_row(series_id: u32, row: EpisodeListRow) -> Self {
        Self {
            thumbnail_url: row.thumbnail_url,
            title: row.title,
            series_id,
            episode_index: row.episode_index,
        }
    }

    /// Identity of an episode: `(series_id, episode_index)`
    pub fn key(&self) -> (u32, u32) {
        (self.series_id, self.episode_index)
    }
}

/// A best comment shown under an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub user_name: String,
    pub contents: String,
}

/// Title and thumbnail found at the top of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesMetadata {
    pub title: String,
    pub thumbnail_url: String,
}

/// One episode row of a listing page, before it is bound to a series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeListRow {
    pub title: String,
    pub thumbnail_url: String,
    pub episode_index: u32,
}

/// Progress of one series' episode listing walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// Next listing page to request (1-based)
    pub next_page: u32,
    /// Last page the walk may reach; equals `upper_bound` once known
    pub window_end: u32,
    /// Page count estimated from page 1's newest episode
    pub upper_bound: Option<u32>,
    /// No further pages hold new episodes
    pub exhausted: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            next_page: 1,
            window_end: 1,
            upper_bound: None,
            exhausted: false,
        }
    }
}

impl PaginationState {
    /// Whether the next page lies outside the known window
    pub fn past_window(&self) -> bool {
        self.upper_bound.is_some() && self.next_page > self.window_end
    }
}

/// Estimate how many listing pages a series has from its newest episode
///
/// The site numbers episodes sequentially and lists a fixed number per page,
/// so `newest / per_page + 1` pages cover every episode.
pub fn estimate_page_count(newest_episode: u32, episodes_per_page: u32) -> u32 {
    newest_episode / episodes_per_page.max(1) + 1
}
