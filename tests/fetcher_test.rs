//! Integration tests for HttpFetcher and the crawler using wiremock
//!
//! These tests validate the HTTP fetcher's behavior with mock servers.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{comment_jsonp, list_page, viewer_page};
use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use toonview::config::Config;
use toonview::crawler::fetcher::{Fetcher, HttpFetcher};
use toonview::crawler::headers::build_page_headers;
use toonview::crawler::Crawler;
use toonview::utils::error::{CrawlerError, DecodeError, FetchError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    HttpFetcher::with_timeout("toonview-test", Duration::from_secs(5)).unwrap()
}

fn crawler_for(server: &MockServer) -> Crawler {
    let mut config = Config::default();
    config.endpoints.comic_base_url = server.uri();
    config.endpoints.comment_api_url =
        format!("{}/commentBox/cbox/web_naver_list_jsonp.json", server.uri());
    Crawler::new(config, Arc::new(fetcher())).unwrap()
}

// ============================================================================
// HttpFetcher Tests
// ============================================================================

/// Test successful fetch from mock server
#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/webtoon/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>신의 탑</html>"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/webtoon/list?titleId=183559&page=1", mock_server.uri());
    let body = fetcher().fetch(&url, HeaderMap::new()).await.unwrap();

    assert_eq!(std::str::from_utf8(&body).unwrap(), "<html>신의 탑</html>");
}

/// Test that every non-2xx status is an error, with no retry
#[tokio::test]
async fn test_non_success_status_is_error() {
    let mock_server = MockServer::start().await;

    for (route, status) in [("/missing", 404), ("/forbidden", 403), ("/broken", 500)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string("error page"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}{route}", mock_server.uri());
        let result = fetcher().fetch(&url, HeaderMap::new()).await;

        match result {
            Err(FetchError::HttpStatus(code)) => assert_eq!(code, status),
            other => panic!("{route}: expected HttpStatus({status}), got {other:?}"),
        }
    }
}

/// Test empty 2xx body
#[tokio::test]
async fn test_empty_body_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let url = format!("{}/empty", mock_server.uri());
    let result = fetcher().fetch(&url, HeaderMap::new()).await;

    assert!(matches!(result, Err(FetchError::EmptyBody)));
}

/// Test timeout handling
#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::with_timeout("toonview-test", Duration::from_millis(200)).unwrap();
    let url = format!("{}/slow", mock_server.uri());
    let result = fetcher.fetch(&url, HeaderMap::new()).await;

    assert!(matches!(result, Err(FetchError::Timeout)), "{result:?}");
}

/// Test that the request carries the headers it was given
#[tokio::test]
async fn test_page_headers_are_sent() {
    let mock_server = MockServer::start().await;
    let url = format!("{}/webtoon/list?titleId=1&page=1", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/webtoon/list"))
        .and(header("referer", url.as_str()))
        .and(header("user-agent", "toonview-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetcher().fetch(&url, build_page_headers(&url)).await;
    assert!(result.is_ok(), "{result:?}");
}

// ============================================================================
// Crawler over HTTP Tests
// ============================================================================

#[tokio::test]
async fn test_crawler_series_and_images() {
    let mock_server = MockServer::start().await;
    let image_url = format!("{}/img/1.jpg", mock_server.uri());

    // Thumbnail and strip images are served from the same mock host
    let listing = list_page(183559, "신의 탑", &[3, 2, 1]).replace(
        "https://shared-comic.pstatic.net/thumb/webtoon/183559/thumbnail/thumbnail.jpg",
        &image_url,
    );

    Mock::given(method("GET"))
        .and(path("/webtoon/list"))
        .and(query_param("titleId", "183559"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/webtoon/detail"))
        .and(query_param("no", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(viewer_page(&[&image_url, ""])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/1.jpg"))
        .and(header("referer", image_url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
        .mount(&mock_server)
        .await;

    let crawler = crawler_for(&mock_server);

    let series = crawler.load_series(183559).await.unwrap();
    assert_eq!(series.title, "신의 탑");
    assert_eq!(series.thumbnail.len(), 3);

    let urls = crawler.episode_images(183559, 3).await.unwrap();
    assert_eq!(urls, vec![image_url.clone()]);

    let images = crawler.fetch_images(&urls, &CancellationToken::new()).await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(&images[0].as_ref().unwrap()[..], &[0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn test_crawler_best_comments() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentBox/cbox/web_naver_list_jsonp.json"))
        .and(query_param("objectId", "183559_237"))
        .and(query_param("ticket", "comic"))
        .and(header("sec-fetch-dest", "script"))
        .respond_with(ResponseTemplate::new(200).set_body_string(comment_jsonp(
            "_callback",
            &[("tow****", "명작", true), ("abc****", "ㅋㅋ", false)],
        )))
        .mount(&mock_server)
        .await;

    let comments = crawler_for(&mock_server).best_comments(183559, 237).await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].user_name, "tow****");
    assert_eq!(comments[0].contents, "명작");
}

#[tokio::test]
async fn test_crawler_comment_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentBox/cbox/web_naver_list_jsonp.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"_callback({"success":false,"code":"3001","message":"not found"});"#,
        ))
        .mount(&mock_server)
        .await;

    let err = crawler_for(&mock_server).best_comments(1, 1).await.unwrap_err();
    assert!(matches!(
        err,
        CrawlerError::Decode(DecodeError::Rejected { ref code, .. }) if code == "3001"
    ));
}
