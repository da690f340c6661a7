//! URL building for Naver Comic pages and the comment API
//!
//! Every request the crawler makes is addressed from here: listing pages,
//! viewer pages, the JSONP comment list and the comment page used as its
//! referer. Base URLs come from configuration so tests can point the crawler
//! at a mock server.

use url::Url;

use crate::config::EndpointConfig;
use crate::utils::error::{FetchError, ParseError};

/// Fixed query parameters of the comment list API
pub mod api {
    /// Ticket for comic comments
    pub const TICKET: &str = "comic";

    /// Template ID for webtoon comment boxes
    pub const TEMPLATE_ID: &str = "webtoon";

    /// Comment pool
    pub const POOL: &str = "cbox3";

    /// Default language
    pub const LANG: &str = "ko";

    /// Default country
    pub const COUNTRY: &str = "KR";

    /// Pagination index size
    pub const INDEX_SIZE: u32 = 10;

    /// Replies per comment
    pub const REPLY_PAGE_SIZE: u32 = 10;
}

/// Builds every URL the crawler requests
#[derive(Debug, Clone)]
pub struct ComicUrls {
    comic_base: Url,
    comment_api: Url,
}

impl ComicUrls {
    /// Create a builder from explicit base URLs
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if either URL cannot be parsed
    pub fn new(comic_base_url: &str, comment_api_url: &str) -> Result<Self, FetchError> {
        let mut comic_base = Url::parse(comic_base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{comic_base_url}: {e}")))?;
        // `join` replaces the last path segment unless the path ends with `/`
        if !comic_base.path().ends_with('/') {
            let path = format!("{}/", comic_base.path());
            comic_base.set_path(&path);
        }
        let comment_api = Url::parse(comment_api_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{comment_api_url}: {e}")))?;

        Ok(Self {
            comic_base,
            comment_api,
        })
    }

    /// Create a builder from the endpoint section of the configuration
    pub fn from_config(endpoints: &EndpointConfig) -> Result<Self, FetchError> {
        Self::new(&endpoints.comic_base_url, &endpoints.comment_api_url)
    }

    /// Episode listing page
    ///
    /// Format: `{base}/webtoon/list?titleId={series_id}&page={page}`
    #[must_use]
    pub fn list_page(&self, series_id: u32, page: u32) -> String {
        let mut url = self.page("webtoon/list");
        url.query_pairs_mut()
            .append_pair("titleId", &series_id.to_string())
            .append_pair("page", &page.to_string());
        url.into()
    }

    /// Episode viewer page
    ///
    /// Format: `{base}/webtoon/detail?titleId={series_id}&no={episode_index}`
    #[must_use]
    pub fn viewer_page(&self, series_id: u32, episode_index: u32) -> String {
        let mut url = self.page("webtoon/detail");
        url.query_pairs_mut()
            .append_pair("titleId", &series_id.to_string())
            .append_pair("no", &episode_index.to_string());
        url.into()
    }

    /// Comment page of an episode; the comment API expects it as referer
    #[must_use]
    pub fn comment_page(&self, series_id: u32, episode_index: u32) -> String {
        let mut url = self.page("comment/comment");
        url.query_pairs_mut()
            .append_pair("titleId", &series_id.to_string())
            .append_pair("no", &episode_index.to_string());
        url.into()
    }

    /// JSONP comment list of an episode
    #[must_use]
    pub fn comment_api(&self, series_id: u32, episode_index: u32, page_size: u32) -> String {
        let object_id = format!("{series_id}_{episode_index}");

        let mut url = self.comment_api.clone();
        url.query_pairs_mut()
            .append_pair("ticket", api::TICKET)
            .append_pair("templateId", api::TEMPLATE_ID)
            .append_pair("pool", api::POOL)
            .append_pair("lang", api::LANG)
            .append_pair("country", api::COUNTRY)
            .append_pair("objectId", &object_id)
            .append_pair("categoryId", "")
            .append_pair("pageSize", &page_size.to_string())
            .append_pair("indexSize", &api::INDEX_SIZE.to_string())
            .append_pair("groupId", "")
            .append_pair("listType", "OBJECT")
            .append_pair("pageType", "default")
            .append_pair("page", "1")
            .append_pair("initialize", "true")
            .append_pair("userType", "")
            .append_pair("useAltSort", "true")
            .append_pair("replyPageSize", &api::REPLY_PAGE_SIZE.to_string());
        url.into()
    }

    fn page(&self, path: &str) -> Url {
        // Joining a relative path onto a parsed base cannot fail
        self.comic_base
            .join(path)
            .unwrap_or_else(|_| self.comic_base.clone())
    }
}

/// Recover `(series_id, episode_index)` from a viewer page URL
///
/// # Errors
///
/// Returns `ParseError::InvalidUrl` if the URL does not parse or lacks a
/// numeric `titleId` or `no` parameter.
///
/// # Examples
///
/// ```
/// use toonview::crawler::url::parse_viewer_url;
///
/// let ids = parse_viewer_url("https://comic.naver.com/webtoon/detail?titleId=183559&no=237");
/// assert_eq!(ids.unwrap(), (183559, 237));
/// ```
pub fn parse_viewer_url(url: &str) -> Result<(u32, u32), ParseError> {
    let parsed = Url::parse(url).map_err(|_| ParseError::InvalidUrl(url.to_string()))?;

    let mut series_id = None;
    let mut episode_index = None;
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "titleId" => series_id = value.parse::<u32>().ok(),
            "no" => episode_index = value.parse::<u32>().ok(),
            _ => {}
        }
    }

    series_id
        .zip(episode_index)
        .ok_or_else(|| ParseError::InvalidUrl(url.to_string()))
}
