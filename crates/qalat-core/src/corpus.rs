// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corpus format — the marker-delimited text artifact produced by the recovery
// pipeline and consumed by the reader.
//
// Every page is serialised as
//
//     "\n\n-- Page <N> --\n\n" + text
//
// and pages are concatenated with nothing in between. Readers split on the
// regular expression in [`MARKER_PATTERN`]. Writer and parser both go through
// this module so the two sides cannot drift apart.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{QalatError, Result};
use crate::types::RecognizedPage;

/// Regular expression matching one page marker; group 1 is the page number.
pub const MARKER_PATTERN: &str = r"-- Page (\d+) --";

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MARKER_PATTERN).expect("marker pattern is a valid regex"));

/// The marker line for a 1-based page index.
pub fn marker(page_index: u32) -> String {
    format!("-- Page {page_index} --")
}

/// Whether `text` contains at least one page marker.
pub fn has_markers(text: &str) -> bool {
    MARKER.is_match(text)
}

/// Rewrite marker-shaped runs inside page text so they no longer parse as
/// markers. `-- Page 9 --` becomes `- - Page 9 --`.
pub fn neutralize_markers(text: &str) -> Cow<'_, str> {
    MARKER.replace_all(text, "- - Page $1 --")
}

/// Split corpus text into page strings (0-indexed, page `i` is page `i + 1`).
///
/// - Text before the first marker is dropped.
/// - Each marker opens exactly one page, trimmed; empty pages are kept so an
///   OCR corpus with blank pages keeps its page count.
/// - Without any marker the whole trimmed input is one page, or no page at all
///   when it is blank.
pub fn parse_pages(text: &str) -> Vec<String> {
    let markers: Vec<_> = MARKER.find_iter(text).collect();

    if markers.is_empty() {
        let trimmed = text.trim();
        debug!(
            chars = trimmed.chars().count(),
            "no page markers found, treating input as a single page"
        );
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let mut pages = Vec::with_capacity(markers.len());
    for (i, m) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
        pages.push(text[m.end()..end].trim().to_string());
    }
    pages
}

/// An ordered, gap-free sequence of recovered pages.
///
/// Pages can only be appended in index order; once built, the corpus is
/// serialised with [`Corpus::to_text`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pages: Vec<RecognizedPage>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(pages: usize) -> Self {
        Self {
            pages: Vec::with_capacity(pages),
        }
    }

    /// Build a corpus from pages that must already be numbered 1..=n.
    pub fn from_pages(pages: impl IntoIterator<Item = RecognizedPage>) -> Result<Self> {
        let mut corpus = Self::new();
        for page in pages {
            corpus.push(page)?;
        }
        Ok(corpus)
    }

    /// Parse corpus text, numbering pages by position.
    pub fn parse(text: &str) -> Self {
        let pages = parse_pages(text)
            .into_iter()
            .zip(1u32..)
            .map(|(text, index)| RecognizedPage::new(index, text))
            .collect();
        Self { pages }
    }

    /// Append the next page. Its index must be exactly `len + 1`.
    ///
    /// Marker-shaped text inside the page is neutralized, so parsing the
    /// serialised corpus yields exactly the pushed pages.
    pub fn push(&mut self, mut page: RecognizedPage) -> Result<()> {
        let expected = self.next_index();
        if page.page_index != expected {
            return Err(QalatError::InvalidCorpus(format!(
                "expected page {expected}, got page {}",
                page.page_index
            )));
        }
        if has_markers(&page.text) {
            debug!(page = page.page_index, "neutralized page markers inside page text");
            page.text = neutralize_markers(&page.text).into_owned();
        }
        self.pages.push(page);
        Ok(())
    }

    /// Index the next appended page must carry.
    pub fn next_index(&self) -> u32 {
        self.pages.len() as u32 + 1
    }

    pub fn pages(&self) -> &[RecognizedPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<RecognizedPage> {
        self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Serialise to the marker-delimited text format.
    pub fn to_text(&self) -> String {
        let capacity = self.pages.iter().map(|p| p.text.len() + 24).sum();
        let mut out = String::with_capacity(capacity);
        for page in &self.pages {
            out.push_str("\n\n");
            out.push_str(&marker(page.page_index));
            out.push_str("\n\n");
            out.push_str(&page.text);
        }
        out
    }
}
