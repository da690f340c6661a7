//! HTML parsing and data extraction
//!
//! This module handles parsing Naver Comic listing and viewer pages into
//! series metadata, episode rows and strip image URLs.

pub mod html;
pub mod selectors;

// Re-export main parser and public types
pub use html::{episode_index_from_thumbnail, ComicParser};
pub use selectors::{PositionalPath, Step};
