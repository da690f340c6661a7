use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONNECTION, REFERER,
};

const ENCODINGS: &str = "gzip, deflate";

const IMAGE_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Build headers for a listing or viewer page
///
/// The comic site expects the page itself as referer.
///
/// # Examples
///
/// ```
/// use toonview::crawler::headers::build_page_headers;
///
/// let headers = build_page_headers("https://comic.naver.com/webtoon/list?titleId=183559&page=1");
/// assert!(headers.contains_key("referer"));
/// ```
pub fn build_page_headers(page_url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ENCODINGS));
    insert_referer(&mut headers, page_url);

    headers
}

/// Build headers for a strip image or series thumbnail
///
/// The image CDN rejects requests whose referer does not match, so the image
/// URL is sent as its own referer.
pub fn build_image_headers(image_url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ENCODINGS));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    insert_referer(&mut headers, image_url);

    headers
}

/// Build headers for the comment API (JSONP)
///
/// The API is loaded as a cross-site `<script>`; `comment_page_url` is the
/// episode's comment page.
///
/// # Examples
///
/// ```
/// use toonview::crawler::headers::build_comment_headers;
///
/// let headers = build_comment_headers("https://comic.naver.com/comment/comment?titleId=1&no=2");
/// assert_eq!(headers.get("sec-fetch-dest").unwrap(), "script");
/// ```
pub fn build_comment_headers(comment_page_url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ENCODINGS));

    // Sec-Fetch headers of a script load
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-site"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("no-cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("script"),
    );
    insert_referer(&mut headers, comment_page_url);

    headers
}

fn insert_referer(headers: &mut HeaderMap, referer: &str) {
    match HeaderValue::from_str(referer) {
        Ok(value) => {
            headers.insert(REFERER, value);
        }
        Err(_) => tracing::debug!(referer, "Referer is not a valid header value, omitting"),
    }
}
