//! Naver comment API decoder
//!
//! The comment list comes back as JSONP: a JavaScript callback call wrapped
//! around the JSON document. This module strips the wrapper and keeps the
//! comments the site marks as "best".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Comment;
use crate::utils::error::DecodeError;

// ============================================================================
// JSONP Framing
// ============================================================================

/// How the JSONP call wrapper is removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonpFraming {
    /// Take the first balanced `{...}` or `[...]`, whatever the callback name
    #[default]
    Balanced,

    /// Drop exactly `prefix` leading and `suffix` trailing characters
    Fixed { prefix: usize, suffix: usize },
}

impl JsonpFraming {
    /// `_callback(` ... `);`, the wrapper the comment API has always used
    #[must_use]
    pub const fn legacy() -> Self {
        Self::Fixed {
            prefix: 10,
            suffix: 2,
        }
    }
}

/// Remove the JSONP wrapper and return the JSON text inside
///
/// # Errors
///
/// Returns `DecodeError::MalformedWrapper` if the text is too short for a
/// fixed framing or holds no balanced JSON value.
///
/// # Example
/// ```
/// use toonview::crawler::comment::{extract_jsonp, JsonpFraming};
///
/// let jsonp = r#"_callback({"success": true});"#;
/// let json = extract_jsonp(jsonp, JsonpFraming::Balanced).unwrap();
/// assert_eq!(json, r#"{"success": true}"#);
/// ```
pub fn extract_jsonp(text: &str, framing: JsonpFraming) -> Result<&str, DecodeError> {
    match framing {
        JsonpFraming::Fixed { prefix, suffix } => strip_fixed(text, prefix, suffix),
        JsonpFraming::Balanced => extract_balanced(text),
    }
}

fn strip_fixed(text: &str, prefix: usize, suffix: usize) -> Result<&str, DecodeError> {
    let chars = text.chars().count();
    if chars < prefix + suffix {
        return Err(DecodeError::MalformedWrapper(format!(
            "payload has {chars} characters, framing needs {}",
            prefix + suffix
        )));
    }

    let start = byte_offset(text, prefix);
    let end = byte_offset(text, chars - suffix);
    Ok(&text[start..end])
}

/// Byte offset of the `n`th character
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map_or(text.len(), |(offset, _)| offset)
}

fn extract_balanced(text: &str) -> Result<&str, DecodeError> {
    let start = text
        .find(['{', '['])
        .ok_or_else(|| DecodeError::MalformedWrapper("no JSON value in payload".to_string()))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Ok(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    Err(DecodeError::MalformedWrapper(
        "unbalanced JSON value in payload".to_string(),
    ))
}

// ============================================================================
// API Response Structures
// ============================================================================

/// Root of the comment API response
#[derive(Debug, Clone, Deserialize)]
struct CommentEnvelope {
    result: CommentResult,
}

/// Comment list inside `result`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentResult {
    comment_list: Vec<RawComment>,
}

/// A single comment as the API sends it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComment {
    user_name: String,
    contents: String,
    best: bool,
}

// ============================================================================
// Decoder
// ============================================================================

/// Turns comment API bodies into best comments
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentDecoder {
    framing: JsonpFraming,
}

impl CommentDecoder {
    #[must_use]
    pub fn new(framing: JsonpFraming) -> Self {
        Self { framing }
    }

    /// Framing this decoder strips
    #[must_use]
    pub fn framing(&self) -> JsonpFraming {
        self.framing
    }

    /// Decode a JSONP body into the best comments, in API order
    ///
    /// # Errors
    ///
    /// - `DecodeError::MalformedWrapper` if the body is not UTF-8 or the
    ///   unwrapped text is not JSON
    /// - `DecodeError::Rejected` if the API answered `success: false`
    /// - `DecodeError::UnexpectedShape` if `result.commentList` or an entry's
    ///   `best`, `userName` or `contents` is absent or mistyped
    pub fn decode(&self, body: &[u8]) -> Result<Vec<Comment>, DecodeError> {
        let text = std::str::from_utf8(body)
            .map_err(|e| DecodeError::MalformedWrapper(format!("body is not UTF-8: {e}")))?;

        let json = extract_jsonp(text, self.framing)?;

        let value: Value = serde_json::from_str(json)
            .map_err(|e| DecodeError::MalformedWrapper(e.to_string()))?;

        if value.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(DecodeError::Rejected {
                code: value.get("code").map(render).unwrap_or_default(),
                message: value.get("message").map(render).unwrap_or_default(),
            });
        }

        let envelope: CommentEnvelope = serde_json::from_value(value)
            .map_err(|e| DecodeError::UnexpectedShape(e.to_string()))?;

        let total = envelope.result.comment_list.len();
        let best: Vec<Comment> = envelope
            .result
            .comment_list
            .into_iter()
            .filter(|raw| raw.best)
            .map(|raw| Comment {
                user_name: raw.user_name,
                contents: raw.contents,
            })
            .collect();

        tracing::debug!(total, best = best.len(), "Decoded comment list");
        Ok(best)
    }
}

/// `"1000"` and `1000` both render as `1000`
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
