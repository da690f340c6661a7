//! toonview - Naver Comic webtoon browser core
//!
//! Finds a series by id, walks its episode listing page by page, extracts the
//! strip images of an episode and decodes its best comments.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Fetching, listing pagination, images and comments
//! - [`parser`] - Positional HTML extraction from listing and viewer pages
//! - [`models`] - Core data structures and types
//! - [`session`] - The user's in-memory series library
//! - [`error`] - Unified error type and user-facing error states
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use toonview::config::Config;
//! use toonview::crawler::Crawler;
//! use toonview::session::Library;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let crawler = Crawler::from_config(Config::from_env()?)?;
//!     let mut library = Library::new();
//!
//!     let series = crawler.load_series(183559).await?;
//!     library.add(series);
//!
//!     crawler.load_more_episodes(183559, &CancellationToken::new()).await?;
//!     for episode in crawler.episodes(183559).await {
//!         println!("{} {}", episode.episode_index, episode.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod session;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::list::WalkReport;
    pub use crate::crawler::Crawler;
    pub use crate::error::{Error, ErrorCategory, Result, ToonviewErrorTrait, UserState};
    pub use crate::models::{Comment, Episode, Series};
    pub use crate::session::{Library, ReadingTarget};
}

// Direct re-exports for convenience
pub use models::{Comment, Episode, Series};
