//! Common test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use toonview::crawler::fetcher::Fetcher;
use toonview::utils::error::FetchError;

/// Test fixture paths
const FIXTURES_DIR: &str = "tests/fixtures/html";

pub fn load_fixture(filename: &str) -> String {
    let path = format!("{FIXTURES_DIR}/{filename}");
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

/// Serves canned bodies by exact URL; anything else is a 404
#[derive(Default)]
pub struct MockFetcher {
    bodies: Mutex<HashMap<String, Bytes>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, body: impl Into<Bytes>) {
        self.bodies.lock().unwrap().insert(url.to_string(), body.into());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, _headers: HeaderMap) -> Result<Bytes, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(FetchError::HttpStatus(404))
    }
}

pub fn list_url(series_id: u32, page: u32) -> String {
    format!("https://comic.naver.com/webtoon/list?titleId={series_id}&page={page}")
}

pub fn viewer_url(series_id: u32, no: u32) -> String {
    format!("https://comic.naver.com/webtoon/detail?titleId={series_id}&no={no}")
}

fn page_head(fillers: usize) -> String {
    let mut html = String::from(
        "<!DOCTYPE html><html><head><title>네이버 웹툰</title></head><body><div id=\"wrap\">",
    );
    for _ in 0..fillers {
        html.push_str("<div class=\"filler\"></div>");
    }
    html
}

/// Listing page with the standard two header rows and one footer row
pub fn list_page(series_id: u32, title: &str, indices: &[u32]) -> String {
    let mut html = page_head(14);
    html.push_str(&format!(
        "<div id=\"content\"><div class=\"comicinfo\"><div class=\"thumb\">\
         <img src=\"https://shared-comic.pstatic.net/thumb/webtoon/{series_id}/thumbnail/thumbnail.jpg\" title=\"{title}\">\
         </div></div><table class=\"viewList\"><thead><tr><th>제목</th></tr></thead><tbody>\
         <tr class=\"band_banner\"><td></td></tr>"
    ));
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

/// Listing page with only two rows: past the end of the series
pub fn short_list_page() -> String {
    let mut html = page_head(14);
    html.push_str(
        "<div id=\"content\"><table><thead><tr><th>제목</th></tr></thead>\
         <tbody><tr class=\"paginate\"><td></td></tr></tbody></table></div></div></body></html>",
    );
    html
}

/// Viewer page whose strip holds `images`
pub fn viewer_page(images: &[&str]) -> String {
    let mut html = page_head(34);
    html.push_str("<div class=\"wt_viewer\" id=\"comic_view_area\">");
    for src in images {
        html.push_str(&format!("<img src=\"{src}\" alt=\"comic content\">"));
    }
    html.push_str("</div></div></body></html>");
    html
}

/// JSONP comment payload wrapped in `callback(...)`
pub fn comment_jsonp(callback: &str, comments: &[(&str, &str, bool)]) -> String {
    let list: Vec<serde_json::Value> = comments
        .iter()
        .map(|(user, contents, best)| {
            serde_json::json!({
                "commentNo": 1,
                "userName": user,
                "contents": contents,
                "best": best,
            })
        })
        .collect();
    let payload = serde_json::json!({
        "success": true,
        "code": "1000",
        "result": { "commentList": list },
    });
    format!("{callback}({payload});")
}
