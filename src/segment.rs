//! Page segmentation: cut a page body down to the spans that belong to the
//! two languages of interest.
//!
//! Finnish Wiktionary opens a language with a `==Suomi==` style heading line.
//! Hungarian Wiktionary has no headings; entries open with language template
//! markers such as `{{hun}}` or `{{finfn}}`, so the page is split at every
//! known marker instead.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;

pub const SUOMI_HEADING: &str = "==Suomi==\n";
pub const UNKARI_HEADING: &str = "==Unkari==\n";
pub const HUN_MARKER: &str = "{{hun";
pub const FIN_MARKER: &str = "{{fin";

lazy_static! {
    static ref LANGUAGE_HEADING: Regex = Regex::new(r"==\w+==\n").unwrap();
}

/// Which side of the dictionary a section describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// Written in the edition's own language: definitions and examples
    Native,
    /// Entry for a word of the other language: translations
    Foreign,
}

/// Span of a page for one language, starting with its heading or marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub block: Block,
    pub text: String,
}

/// Heading-delimited segmentation (Finnish Wiktionary).
///
/// Each language section runs from its first heading to the next level-2
/// heading of any language, or to the end of the page.
pub fn segment_headings(page: &str) -> Vec<Section> {
    let headings: Vec<regex::Match> = LANGUAGE_HEADING.find_iter(page).collect();
    let mut sections = Vec::new();

    for (heading, block) in [(SUOMI_HEADING, Block::Native), (UNKARI_HEADING, Block::Foreign)] {
        if !page.contains(heading) {
            continue;
        }
        let Some(index) = headings.iter().position(|m| m.as_str() == heading) else {
            continue;
        };
        let start = headings[index].end();
        let end = headings.get(index + 1).map_or(page.len(), |next| next.start());
        sections.push(Section {
            block,
            text: format!("{}{}", heading, &page[start..end]),
        });
    }

    sections
}

/// Template-marker segmentation (Hungarian Wiktionary)
#[derive(Debug, Clone)]
pub struct MarkerSegmenter {
    markers: Regex,
}

impl MarkerSegmenter {
    /// Build from the known language-code markers (`{{fin`, `{{eng`, ...).
    /// The two markers of interest are always included.
    pub fn new(codes: &[String]) -> Result<Self> {
        let mut markers: Vec<&str> = codes.iter().map(String::as_str).collect();
        for marker in [HUN_MARKER, FIN_MARKER] {
            if !markers.contains(&marker) {
                markers.push(marker);
            }
        }
        let alternation = markers
            .iter()
            .map(|marker| regex::escape(marker))
            .collect::<Vec<_>>()
            .join("|");
        Ok(MarkerSegmenter {
            markers: Regex::new(&alternation)?,
        })
    }

    /// Split at every marker, keeping the markers as pieces
    fn pieces<'a>(&self, page: &'a str) -> Vec<&'a str> {
        let mut pieces = Vec::new();
        let mut last = 0;
        for found in self.markers.find_iter(page) {
            pieces.push(&page[last..found.start()]);
            pieces.push(found.as_str());
            last = found.end();
        }
        pieces.push(&page[last..]);
        pieces
    }

    /// Each `{{hun` / `{{fin` marker is glued to the piece that follows it.
    /// Other markers only end the previous piece.
    pub fn segment(&self, page: &str) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut pending: Option<(&str, Block)> = None;

        for piece in self.pieces(page) {
            if piece.is_empty() {
                continue;
            }
            let interest = match piece {
                HUN_MARKER => Some(Block::Native),
                FIN_MARKER => Some(Block::Foreign),
                _ => None,
            };
            if let Some(block) = interest {
                pending = Some((piece, block));
            } else if let Some((marker, block)) = pending.take() {
                sections.push(Section {
                    block,
                    text: format!("{}{}", marker, piece),
                });
            }
        }

        sections
    }
}
