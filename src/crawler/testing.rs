//! Scripted fetcher and page builders for crawler unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use tokio::sync::Semaphore;

use crate::crawler::fetcher::Fetcher;
use crate::utils::error::FetchError;

/// Serves canned bodies by exact URL; anything else is a 404
#[derive(Default)]
pub struct ScriptedFetcher {
    bodies: Mutex<HashMap<String, Bytes>>,
    requests: Mutex<Vec<(String, HeaderMap)>>,
    gate: Option<Semaphore>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every fetch until [`open_gate`](Self::open_gate) is called
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Let `permits` more fetches through
    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn insert(&self, url: &str, body: impl Into<Bytes>) {
        self.bodies.lock().unwrap().insert(url.to_string(), body.into());
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Headers sent with the last request to `url`
    pub fn headers_for(&self, url: &str) -> Option<HeaderMap> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(u, _)| u == url)
            .map(|(_, headers)| headers.clone())
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<Bytes, FetchError> {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.requests.lock().unwrap().push((url.to_string(), headers));
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(FetchError::HttpStatus(404))
    }
}

/// Opening of a comic page up to the block the positional paths aim at
fn page_head() -> String {
    let mut html = String::from("<html><body><div id=\"wrap\">");
    for _ in 0..14 {
        html.push_str("<div class=\"filler\"></div>");
    }
    html
}

/// Listing page of `series_id` with one row per entry of `indices`
pub fn list_page(series_id: u32, title: &str, indices: &[u32]) -> String {
    let mut html = page_head();
    html.push_str(&format!(
        "<div id=\"content\"><div class=\"comicinfo\"><div class=\"thumb\">\
         <img src=\"https://shared-comic.pstatic.net/thumb/webtoon/{series_id}/thumbnail/thumbnail.jpg\" title=\"{title}\">\
         </div></div>"
    ));
    html.push_str("<table><thead><tr><th>제목</th></tr></thead><tbody>");
    html.push_str("<tr class=\"band_banner\"><td></td></tr>");
    for no in indices {
        html.push_str(&format!(
            "<tr><td><a href=\"/webtoon/detail?titleId={series_id}&amp;no={no}\">\
             <img src=\"https://image-comic.pstatic.net/webtoon/{series_id}/{no}/thumbnail_202x120.jpg\" title=\"{no}화\">\
             </a></td><td class=\"title\">{no}화</td></tr>"
        ));
    }
    html.push_str("<tr class=\"paginate\"><td></td></tr></tbody></table></div></div></body></html>");
    html
}

/// Listing page past the last one: header and footer rows only
pub fn short_list_page() -> String {
    let mut html = page_head();
    html.push_str(
        "<div id=\"content\"><table><thead><tr><th>제목</th></tr></thead>\
         <tbody><tr class=\"paginate\"><td></td></tr></tbody></table></div></div></body></html>",
    );
    html
}

/// Viewer page whose strip holds `images`
pub fn viewer_page(images: &[&str]) -> String {
    let mut html = String::from("<html><body><div id=\"wrap\">");
    for _ in 0..34 {
        html.push_str("<div class=\"filler\"></div>");
    }
    html.push_str("<div class=\"wt_viewer\" id=\"comic_view_area\">");
    for src in images {
        html.push_str(&format!("<img src=\"{src}\" alt=\"comic content\">"));
    }
    html.push_str("</div></div></body></html>");
    html
}
