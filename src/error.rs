//! Unified error handling for the toonview crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`ToonviewErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`UserState`] - What a front end should show for a failed action
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use toonview::error::{Error, ToonviewErrorTrait, UserState};
//!
//! fn render(err: &Error) {
//!     match err.user_state() {
//!         UserState::NetworkUnavailable => show_offline_banner(),
//!         UserState::SiteChanged => show_site_changed(),
//!         _ => show_generic(err),
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{CrawlerError, DecodeError, FetchError, ParseError};

/// Common trait for all toonview error types
pub trait ToonviewErrorTrait: std::error::Error {
    /// Check if this error is recoverable (the action can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;

    /// Get the state a front end should surface for this failure
    fn user_state(&self) -> UserState;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (transport, status, empty body)
    Network,
    /// Markup and payload extraction errors
    Parsing,
    /// Walk coordination errors (busy, cancelled)
    Concurrency,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

/// User-facing outcome of a failed action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserState {
    /// The series or episode does not exist (404)
    NotFound,
    /// Network unreachable, timed out or the server is failing
    NetworkUnavailable,
    /// The site's markup or API shape no longer matches
    SiteChanged,
    /// The same listing is already loading
    Busy,
    /// The view went away
    Cancelled,
    /// Anything else
    Unavailable,
}

impl UserState {
    /// Short English label for status lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::NetworkUnavailable => "network unavailable",
            Self::SiteChanged => "site changed",
            Self::Busy => "already loading",
            Self::Cancelled => "cancelled",
            Self::Unavailable => "unavailable",
        }
    }
}

impl ToonviewErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        FetchError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidUrl(_) => ErrorCategory::Config,
            _ => ErrorCategory::Network,
        }
    }

    fn user_state(&self) -> UserState {
        match self {
            Self::HttpStatus(404) => UserState::NotFound,
            Self::Network(_) | Self::Timeout | Self::HttpStatus(_) => UserState::NetworkUnavailable,
            Self::EmptyBody | Self::InvalidUrl(_) => UserState::Unavailable,
        }
    }
}

impl ToonviewErrorTrait for ParseError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }

    fn user_state(&self) -> UserState {
        match self {
            // A series id with no listing rows is most likely unknown to the site
            Self::NoMoreRows { .. } => UserState::NotFound,
            _ => UserState::SiteChanged,
        }
    }
}

impl ToonviewErrorTrait for DecodeError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }

    fn user_state(&self) -> UserState {
        match self {
            Self::Rejected { .. } => UserState::Unavailable,
            _ => UserState::SiteChanged,
        }
    }
}

impl ToonviewErrorTrait for CrawlerError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(e) => ToonviewErrorTrait::is_recoverable(e),
            Self::Decode(e) => ToonviewErrorTrait::is_recoverable(e),
            Self::WalkInProgress { .. } | Self::Cancelled => true,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => ToonviewErrorTrait::category(e),
            Self::Parse(_) | Self::Decode(_) => ErrorCategory::Parsing,
            Self::WalkInProgress { .. } | Self::Cancelled => ErrorCategory::Concurrency,
        }
    }

    fn user_state(&self) -> UserState {
        match self {
            Self::Fetch(e) => e.user_state(),
            Self::Parse(e) => e.user_state(),
            Self::Decode(e) => e.user_state(),
            Self::WalkInProgress { .. } => UserState::Busy,
            Self::Cancelled => UserState::Cancelled,
        }
    }
}

/// Unified error type for the toonview crate
///
/// This enum wraps all domain-specific errors, providing a single error type
/// that can be used across module boundaries while preserving the detailed
/// error information.
#[derive(Error, Debug)]
pub enum Error {
    /// Crawler-related errors (fetch, parse, decode, walk)
    #[error("Crawler error: {0}")]
    Crawler(#[from] CrawlerError),

    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Comment decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ToonviewErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Crawler(e) => e.is_recoverable(),
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(e) => ToonviewErrorTrait::is_recoverable(e),
            Self::Decode(e) => ToonviewErrorTrait::is_recoverable(e),
            Self::Io(_) => true, // I/O errors are often transient
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Crawler(e) => e.category(),
            Self::Fetch(e) => ToonviewErrorTrait::category(e),
            Self::Parse(_) | Self::Decode(_) => ErrorCategory::Parsing,
            Self::Io(_) => ErrorCategory::Other,
        }
    }

    fn user_state(&self) -> UserState {
        match self {
            Self::Crawler(e) => e.user_state(),
            Self::Fetch(e) => e.user_state(),
            Self::Parse(e) => e.user_state(),
            Self::Decode(e) => e.user_state(),
            Self::Io(_) => UserState::Unavailable,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
