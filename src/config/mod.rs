//! Configuration management for the toonview crawler
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::crawler::comment::JsonpFraming;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP client configuration
    pub client: ClientConfig,

    /// Site endpoints
    pub endpoints: EndpointConfig,

    /// Episode listing pagination
    pub pagination: PaginationConfig,

    /// Comment API configuration
    pub comments: CommentConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Maximum number of images fetched at once
    pub max_concurrent_images: usize,
}

/// Base URLs of the comic site and the comment API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Comic site root, e.g. `https://comic.naver.com`
    pub comic_base_url: String,

    /// JSONP comment list endpoint
    pub comment_api_url: String,
}

/// Episode listing pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Pages fetched by one "load more"
    pub pages_per_load: u32,

    /// Episodes the site shows per listing page
    pub episodes_per_page: u32,
}

/// Comment API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    /// How the JSONP wrapper is removed
    pub framing: JsonpFraming,

    /// Comments requested per call
    pub page_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: format!("toonview/{}", env!("CARGO_PKG_VERSION")),
            max_concurrent_images: 4,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            comic_base_url: String::from("https://comic.naver.com"),
            comment_api_url: String::from(
                "https://apis.naver.com/commentBox/cbox/web_naver_list_jsonp.json",
            ),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            pages_per_load: 5,
            episodes_per_page: 10,
        }
    }
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            framing: JsonpFraming::Balanced,
            page_size: 150,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables keep their default value.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse::<u64>("TOONVIEW_REQUEST_TIMEOUT") {
            config.client.request_timeout_secs = v;
        }
        if let Ok(v) = std::env::var("TOONVIEW_USER_AGENT") {
            config.client.user_agent = v;
        }
        if let Some(v) = env_parse::<usize>("TOONVIEW_MAX_CONCURRENT_IMAGES") {
            config.client.max_concurrent_images = v;
        }
        if let Ok(v) = std::env::var("TOONVIEW_COMIC_BASE_URL") {
            config.endpoints.comic_base_url = v;
        }
        if let Ok(v) = std::env::var("TOONVIEW_COMMENT_API_URL") {
            config.endpoints.comment_api_url = v;
        }
        if let Some(v) = env_parse::<u32>("TOONVIEW_PAGES_PER_LOAD") {
            config.pagination.pages_per_load = v;
        }
        if let Ok(v) = std::env::var("TOONVIEW_COMMENT_FRAMING") {
            config.comments.framing = match v.to_lowercase().as_str() {
                "fixed" => JsonpFraming::legacy(),
                _ => JsonpFraming::Balanced,
            };
        }
        if let Ok(v) = std::env::var("TOONVIEW_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("TOONVIEW_LOG_FORMAT") {
            config.logging.format = v;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.client.max_concurrent_images == 0 {
            anyhow::bail!("max_concurrent_images must be greater than 0");
        }

        if self.pagination.pages_per_load == 0 {
            anyhow::bail!("pages_per_load must be greater than 0");
        }

        if self.pagination.episodes_per_page == 0 {
            anyhow::bail!("episodes_per_page must be greater than 0");
        }

        if self.comments.page_size == 0 {
            anyhow::bail!("comment page_size must be greater than 0");
        }

        Url::parse(&self.endpoints.comic_base_url).context("Invalid comic_base_url")?;
        Url::parse(&self.endpoints.comment_api_url).context("Invalid comment_api_url")?;

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.client.request_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
