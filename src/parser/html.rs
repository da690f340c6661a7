//! Listing and viewer page parser
//!
//! This module turns Naver Comic HTML into series metadata, episode rows and
//! strip image URLs by resolving the positional paths in
//! [`crate::parser::selectors`].

use scraper::{ElementRef, Html};

use crate::models::{EpisodeListRow, SeriesMetadata};
use crate::parser::selectors::{
    PositionalPath, EPISODE_INDEX_DIGIT_RUN, EPISODE_ROWS, LIST_FOOTER_ROWS, LIST_HEADER_ROWS,
    MIN_LIST_ROWS, ROW_THUMBNAIL, SERIES_THUMBNAIL, VIEWER_IMAGES,
};
use crate::utils::digit_runs;
use crate::utils::error::ParseError;

/// Comic page parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ComicParser;

impl ComicParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse the series title and thumbnail URL from a listing page
    ///
    /// # Errors
    ///
    /// Returns `ParseError::StructureMismatch` if the thumbnail block moved and
    /// `ParseError::MissingAttribute` if the image has no `src`.
    pub fn parse_series_metadata(&self, html: &str) -> Result<SeriesMetadata, ParseError> {
        let document = Html::parse_document(html);
        let img = SERIES_THUMBNAIL.resolve_one(document.root_element())?;

        let thumbnail_url = required_attr(img, &SERIES_THUMBNAIL, "src")?;
        let title = img.value().attr("title").unwrap_or_default().to_string();

        Ok(SeriesMetadata {
            title,
            thumbnail_url,
        })
    }

    /// Parse the episode rows of one listing page, in page order
    ///
    /// The table opens with two non-episode rows and closes with one; those
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::NoMoreRows` when the table has fewer than
    /// [`MIN_LIST_ROWS`] rows. Callers walking pages treat it as the end of
    /// the listing, not as a failure.
    pub fn parse_episode_list_page(&self, html: &str) -> Result<Vec<EpisodeListRow>, ParseError> {
        self.parse_episode_rows(html)?.into_iter().collect()
    }

    /// Parse the episode rows of one listing page, one result per row
    ///
    /// A broken row does not hide its neighbours: the walker keeps the rows
    /// that parse and skips the rest.
    ///
    /// # Errors
    ///
    /// Fails only for the page as a whole: `ParseError::NoMoreRows` as in
    /// [`parse_episode_list_page`](Self::parse_episode_list_page), or
    /// `ParseError::StructureMismatch` when the episode table moved.
    pub fn parse_episode_rows(
        &self,
        html: &str,
    ) -> Result<Vec<Result<EpisodeListRow, ParseError>>, ParseError> {
        let document = Html::parse_document(html);
        let rows = EPISODE_ROWS.resolve(document.root_element())?;

        if rows.len() < MIN_LIST_ROWS {
            return Err(ParseError::NoMoreRows { rows: rows.len() });
        }

        Ok(rows[LIST_HEADER_ROWS..rows.len() - LIST_FOOTER_ROWS]
            .iter()
            .map(|row| parse_row(*row))
            .collect())
    }

    /// Parse the strip image URLs of a viewer page, in document order
    ///
    /// Images with an empty `src` are placeholders for banners and other
    /// non-strip content and are skipped.
    pub fn parse_episode_images(&self, html: &str) -> Result<Vec<String>, ParseError> {
        let document = Html::parse_document(html);
        let images = VIEWER_IMAGES.resolve(document.root_element())?;

        Ok(images
            .into_iter()
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(str::to_string)
            .collect())
    }
}

fn parse_row(row: ElementRef<'_>) -> Result<EpisodeListRow, ParseError> {
    let img = ROW_THUMBNAIL.resolve_one(row)?;

    let thumbnail_url = required_attr(img, &ROW_THUMBNAIL, "src")?;
    let title = img.value().attr("title").unwrap_or_default().to_string();
    let episode_index = episode_index_from_thumbnail(&thumbnail_url)?;

    Ok(EpisodeListRow {
        title,
        thumbnail_url,
        episode_index,
    })
}

/// Extract the episode number encoded in a thumbnail URL
///
/// Thumbnails live at `.../webtoon/{titleId}/{no}/thumbnail_...`, so the
/// episode number is the second run of digits.
///
/// # Errors
///
/// Returns `ParseError::InvalidEpisodeIndex` if the URL has fewer digit runs
/// or the run does not fit a `u32`.
pub fn episode_index_from_thumbnail(url: &str) -> Result<u32, ParseError> {
    digit_runs(url)
        .get(EPISODE_INDEX_DIGIT_RUN)
        .and_then(|run| run.parse::<u32>().ok())
        .ok_or_else(|| ParseError::InvalidEpisodeIndex(url.to_string()))
}

fn required_attr(
    element: ElementRef<'_>,
    path: &PositionalPath,
    attribute: &'static str,
) -> Result<String, ParseError> {
    element
        .value()
        .attr(attribute)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ParseError::MissingAttribute {
            path: path.name,
            attribute,
        })
}
