//! Positional paths into Naver Comic markup
//!
//! The comic pages carry almost no stable class names, so every extraction
//! walks a fixed chain of "nth element with this tag" steps. All magic indices
//! live in the table below; when the site moves a block, this is the only
//! place to touch.
//!
//! A step is resolved with descendant-or-self scoping: among
//! the current element *and* its descendants, in document order, keep those
//! with the step's tag and pick the nth. `div[0] -> div[15]` therefore means
//! "the 15th div nested anywhere below the first div of the page".

use scraper::ElementRef;

use crate::utils::error::ParseError;

/// Which matches of a step to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// The match at this zero-based position
    Nth(usize),
    /// Every match, in document order
    All,
}

/// One level of a positional path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub tag: &'static str,
    pub pick: Pick,
}

const fn nth(tag: &'static str, index: usize) -> Step {
    Step {
        tag,
        pick: Pick::Nth(index),
    }
}

const fn all(tag: &'static str) -> Step {
    Step {
        tag,
        pick: Pick::All,
    }
}

/// A named chain of positional steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalPath {
    pub name: &'static str,
    pub steps: &'static [Step],
}

/// Series thumbnail `<img>` on a listing page; carries `title` and `src`
pub const SERIES_THUMBNAIL: PositionalPath = PositionalPath {
    name: "series_thumbnail",
    steps: &[
        nth("div", 0),
        nth("div", 15),
        nth("div", 1),
        nth("div", 1),
        nth("img", 0),
    ],
};

/// Every `<tr>` of the episode table on a listing page
pub const EPISODE_ROWS: PositionalPath = PositionalPath {
    name: "episode_rows",
    steps: &[nth("div", 0), nth("div", 15), all("tr")],
};

/// Thumbnail `<img>` inside one episode row
pub const ROW_THUMBNAIL: PositionalPath = PositionalPath {
    name: "row_thumbnail",
    steps: &[nth("td", 0), nth("img", 0)],
};

/// Every `<img>` of the strip on a viewer page
pub const VIEWER_IMAGES: PositionalPath = PositionalPath {
    name: "viewer_images",
    steps: &[nth("div", 0), nth("div", 35), all("img")],
};

/// Leading rows of the episode table that are not episodes
pub const LIST_HEADER_ROWS: usize = 2;

/// Trailing rows of the episode table that are not episodes
pub const LIST_FOOTER_ROWS: usize = 1;

/// Below this many raw rows a listing page holds no episodes
pub const MIN_LIST_ROWS: usize = 4;

/// Position of the episode number among the digit runs of a thumbnail URL
///
/// `.../webtoon/{titleId}/{no}/thumbnail_...jpg`: run 0 is the title id.
pub const EPISODE_INDEX_DIGIT_RUN: usize = 1;

impl PositionalPath {
    /// Resolve the path below `root`
    ///
    /// Returns one element per surviving branch; a path made only of
    /// [`Pick::Nth`] steps yields exactly one element.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::StructureMismatch` naming the first step whose
    /// index was out of range.
    pub fn resolve<'a>(&self, root: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>, ParseError> {
        let mut current = vec![root];

        for (step_no, step) in self.steps.iter().enumerate() {
            let mut next = Vec::new();

            for element in current {
                let mut matches = scoped(element, step.tag);

                match step.pick {
                    Pick::Nth(index) => {
                        let picked = matches.by_ref().nth(index).ok_or_else(|| {
                            ParseError::StructureMismatch {
                                path: self.name,
                                step: step_no,
                                tag: step.tag,
                                index,
                                available: scoped(element, step.tag).count(),
                            }
                        })?;
                        next.push(picked);
                    }
                    Pick::All => next.extend(matches),
                }
            }

            current = next;
        }

        Ok(current)
    }

    /// Resolve a path that must end on a single element
    pub fn resolve_one<'a>(&self, root: ElementRef<'a>) -> Result<ElementRef<'a>, ParseError> {
        let resolved = self.resolve(root)?;
        resolved
            .into_iter()
            .next()
            .ok_or(ParseError::StructureMismatch {
                path: self.name,
                step: self.steps.len().saturating_sub(1),
                tag: self.steps.last().map(|s| s.tag).unwrap_or(""),
                index: 0,
                available: 0,
            })
    }
}

/// `element` itself and its descendants carrying `tag`, in document order
fn scoped<'a>(element: ElementRef<'a>, tag: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |e| e.value().name() == tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_paths_are_named_and_nonempty() {
        for path in [SERIES_THUMBNAIL, EPISODE_ROWS, ROW_THUMBNAIL, VIEWER_IMAGES] {
            assert!(!path.name.is_empty());
            assert!(!path.steps.is_empty());
        }
    }

    #[test]
    fn test_only_final_steps_select_all() {
        for path in [SERIES_THUMBNAIL, EPISODE_ROWS, ROW_THUMBNAIL, VIEWER_IMAGES] {
            let (_, init) = path.steps.split_last().unwrap();
            assert!(init.iter().all(|s| matches!(s.pick, Pick::Nth(_))));
        }
    }

    #[test]
    fn test_step_counts_the_element_itself() {
        let html = Html::parse_document(
            r#"<div id="outer"><div id="a"><div id="b"></div></div><div id="c"></div></div>"#,
        );
        const PATH: PositionalPath = PositionalPath {
            name: "test",
            steps: &[nth("div", 0), nth("div", 2)],
        };

        let found = PATH.resolve_one(html.root_element()).unwrap();
        assert_eq!(found.value().id(), Some("b"));

        const SELF_PATH: PositionalPath = PositionalPath {
            name: "test_self",
            steps: &[nth("div", 0), nth("div", 0)],
        };
        let found = SELF_PATH.resolve_one(html.root_element()).unwrap();
        assert_eq!(found.value().id(), Some("outer"));
    }

    #[test]
    fn test_out_of_range_reports_step() {
        let html = Html::parse_document(r#"<div><div></div></div>"#);
        let err = VIEWER_IMAGES.resolve(html.root_element()).unwrap_err();
        assert_eq!(
            err,
            ParseError::StructureMismatch {
                path: "viewer_images",
                step: 1,
                tag: "div",
                index: 35,
                available: 2,
            }
        );
    }

    #[test]
    fn test_all_keeps_document_order() {
        let html = Html::parse_document(
            r#"<table><tr id="r0"><td>a</td></tr><tr id="r1"><td>b</td></tr></table>"#,
        );
        const ROWS: PositionalPath = PositionalPath {
            name: "rows",
            steps: &[nth("table", 0), all("tr")],
        };
        let rows = ROWS.resolve(html.root_element()).unwrap();
        let ids: Vec<_> = rows.iter().filter_map(|r| r.value().id()).collect();
        assert_eq!(ids, vec!["r0", "r1"]);
    }
}
