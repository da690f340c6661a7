//! Error types for the toonview crawler
//!
//! This module defines custom error types used throughout the application.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("Network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response had a success status but no body
    #[error("Response body was empty")]
    EmptyBody,

    /// Any non-2xx status code
    #[error("HTTP status error: {0}")]
    HttpStatus(u16),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether a later attempt at the same request could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::HttpStatus(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::EmptyBody | Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur while walking the positional markup paths
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An expected positional index was out of range: the markup changed shape
    #[error(
        "Structure mismatch on {path}: step {step} wanted {tag}[{index}] but only {available} found"
    )]
    StructureMismatch {
        path: &'static str,
        step: usize,
        tag: &'static str,
        index: usize,
        available: usize,
    },

    /// The leaf element lacked an attribute the extraction needs
    #[error("Missing attribute `{attribute}` on {path}")]
    MissingAttribute {
        path: &'static str,
        attribute: &'static str,
    },

    /// URL is not a viewer page address
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Thumbnail URL did not carry an episode number
    #[error("No episode index in thumbnail URL: {0}")]
    InvalidEpisodeIndex(String),

    /// Listing page holds only header/footer rows; not a failure
    #[error("No more episode rows ({rows} raw rows)")]
    NoMoreRows { rows: usize },
}

impl ParseError {
    /// `NoMoreRows` marks the end of a listing, everything else a broken page
    pub fn is_end_of_listing(&self) -> bool {
        matches!(self, Self::NoMoreRows { .. })
    }
}

/// Errors that can occur while decoding the JSONP comment payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload framing could not be removed or left invalid JSON behind
    #[error("Malformed JSONP wrapper: {0}")]
    MalformedWrapper(String),

    /// Valid JSON that does not carry `result.commentList[*].best`
    #[error("Unexpected comment payload shape: {0}")]
    UnexpectedShape(String),

    /// The API answered with `success: false`
    #[error("Comment API rejected the request: {code} {message}")]
    Rejected { code: String, message: String },
}

/// General crawler errors
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Comment decoding error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Another episode walk for the same series has not returned yet
    #[error("Episode listing for series {series_id} is already loading")]
    WalkInProgress { series_id: u32 },

    /// The owning view went away before the action finished
    #[error("Cancelled")]
    Cancelled,
}
