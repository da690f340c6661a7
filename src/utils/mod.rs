//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use encoding_rs::{EUC_KR, UTF_8};
use regex::Regex;
use std::sync::OnceLock;

/// Decode a response body to text
///
/// Tries UTF-8 first and falls back to EUC-KR, which older Naver pages still
/// serve. Undecodable bytes become replacement characters.
pub fn decode_body(bytes: &[u8]) -> String {
    let (cow, _encoding, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return cow.into_owned();
    }

    let (cow, _encoding, had_errors) = EUC_KR.decode(bytes);
    if had_errors {
        tracing::debug!(len = bytes.len(), "Body is neither clean UTF-8 nor EUC-KR");
    }
    cow.into_owned()
}

/// Collect every maximal run of ASCII digits in `text`, in order
pub fn digit_runs(text: &str) -> Vec<&str> {
    static DIGITS_RE: OnceLock<Regex> = OnceLock::new();

    let re = DIGITS_RE.get_or_init(|| Regex::new(r"[0-9]+").expect("Invalid regex pattern"));

    re.find_iter(text).map(|m| m.as_str()).collect()
}
