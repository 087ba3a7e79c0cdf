// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keyword annotation — derives at most one bookmark and one note per page from
// the first keyword occurrence.

use qalat_core::config::AnnotationSettings;
use qalat_core::types::{AnnotationCandidate, Bookmark, Note};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Scans pages for an ordered keyword set.
///
/// For each page only the first keyword (in set order) that occurs is
/// reported, together with a context snippet of up to `before` characters
/// before the match and `after` characters after it. Windows count Unicode
/// scalar values, so Ge'ez text is never cut inside a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordAnnotator {
    keywords: Vec<String>,
    before: usize,
    after: usize,
}

impl KeywordAnnotator {
    /// Empty keywords are ignored; they would match every page.
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>, before: usize, after: usize) -> Self {
        let keywords = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.is_empty())
            .collect();
        Self {
            keywords,
            before,
            after,
        }
    }

    pub fn from_settings(settings: &AnnotationSettings) -> Self {
        Self::new(settings.keywords.iter().cloned(), settings.before, settings.after)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// One candidate per page that contains any keyword, in page order.
    /// `pages[i]` is page `i + 1`.
    #[instrument(skip_all, fields(pages = pages.len(), keywords = self.keywords.len()))]
    pub fn annotate<S: AsRef<str>>(&self, pages: &[S]) -> Vec<AnnotationCandidate> {
        let candidates: Vec<_> = pages
            .iter()
            .zip(1u32..)
            .filter_map(|(text, page_index)| self.annotate_page(page_index, text.as_ref()))
            .collect();
        debug!(candidates = candidates.len(), "Annotation scan complete");
        candidates
    }

    /// The candidate for a single page, if any keyword occurs in it.
    pub fn annotate_page(&self, page_index: u32, text: &str) -> Option<AnnotationCandidate> {
        self.keywords.iter().find_map(|keyword| {
            let start = text.find(keyword.as_str())?;
            let end = start + keyword.len();
            Some(AnnotationCandidate {
                page_index,
                keyword: keyword.clone(),
                snippet: snippet(text, start, end, self.before, self.after),
            })
        })
    }
}

impl Default for KeywordAnnotator {
    fn default() -> Self {
        Self::from_settings(&AnnotationSettings::default())
    }
}

/// Whitespace-normalised context around the byte range `start..end`.
fn snippet(text: &str, start: usize, end: usize, before: usize, after: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(before)
        .last()
        .map_or(start, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .nth(after)
        .map_or(text.len(), |(i, _)| end + i);

    text[from..to].split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Bookmarks and notes for a reading view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub bookmarks: Vec<Bookmark>,
    pub notes: Vec<Note>,
}

impl Annotations {
    /// Bookmark carries the snippet; note reads `<label>: <keyword> - <snippet>`.
    pub fn from_candidates(candidates: &[AnnotationCandidate], note_label: &str) -> Self {
        let bookmarks = candidates
            .iter()
            .map(|c| Bookmark {
                page: c.page_index,
                note: c.snippet.clone(),
            })
            .collect();
        let notes = candidates
            .iter()
            .map(|c| Note {
                page: c.page_index,
                text: format!("{note_label}: {} - {}", c.keyword, c.snippet),
            })
            .collect();
        Self { bookmarks, notes }
    }

    pub fn bookmark_for(&self, page: u32) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.page == page)
    }

    pub fn note_for(&self, page: u32) -> Option<&Note> {
        self.notes.iter().find(|n| n.page == page)
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty() && self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use qalat_core::corpus::parse_pages;

    use super::*;

    #[test]
    fn documented_example_yields_one_candidate() {
        let pages = parse_pages("-- Page 1 --\n\nHello world\n\n-- Page 2 --\n\nPrice is 50 ETB today");
        let annotator = KeywordAnnotator::new(["ETB"], 20, 20);

        assert_eq!(
            annotator.annotate(&pages),
            vec![AnnotationCandidate {
                page_index: 2,
                keyword: "ETB".into(),
                snippet: "Price is 50 ETB today".into(),
            }]
        );
    }

    #[test]
    fn first_keyword_in_set_order_wins() {
        // "ብር" appears before "ገንዘብ" in the text, but "ገንዘብ" is first in the set.
        let pages = ["ብር ነው። ገንዘብ ብዙ ነው።"];
        let annotator = KeywordAnnotator::new(["ገንዘብ", "ብር"], 40, 80);
        let candidates = annotator.annotate(&pages);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].keyword, "ገንዘብ");
    }

    #[test]
    fn snippet_window_counts_characters_on_both_sides() {
        let text = "abcdefghij KEY klmnopqrst";
        let annotator = KeywordAnnotator::new(["KEY"], 3, 4);
        let candidate = annotator.annotate_page(1, text).unwrap();
        assert_eq!(candidate.snippet, "ij KEY klm");
    }

    #[test]
    fn snippet_is_clipped_at_page_boundaries() {
        let annotator = KeywordAnnotator::new(["ወርቅ"], 40, 80);
        let candidate = annotator.annotate_page(5, "ወርቅ").unwrap();
        assert_eq!(candidate.snippet, "ወርቅ");
        assert_eq!(candidate.page_index, 5);
    }

    #[test]
    fn ge_ez_window_is_not_cut_inside_a_character() {
        let annotator = KeywordAnnotator::new(["ብር"], 2, 2);
        let candidate = annotator.annotate_page(1, "ሀሁሂሃ ብር ሄህሆ").unwrap();
        assert_eq!(candidate.snippet, "ሃ ብር ሄ");
    }

    #[test]
    fn snippet_collapses_whitespace() {
        let annotator = KeywordAnnotator::new(["ETB"], 40, 80);
        let candidate = annotator
            .annotate_page(1, "  Price\n\n is\t50   ETB\n today  ")
            .unwrap();
        assert_eq!(candidate.snippet, "Price is 50 ETB today");
    }

    #[test]
    fn pages_without_keywords_are_skipped() {
        let annotator = KeywordAnnotator::default();
        assert!(annotator.annotate(&["Hello world", ""]).is_empty());
    }

    #[test]
    fn empty_keywords_are_ignored() {
        let annotator = KeywordAnnotator::new(["", "ETB"], 10, 10);
        assert_eq!(annotator.keywords(), ["ETB"]);
    }

    #[test]
    fn projection_builds_bookmarks_and_labelled_notes() {
        let candidates = vec![AnnotationCandidate {
            page_index: 12,
            keyword: "ገንዘብ".into(),
            snippet: "ስለ ገንዘብ".into(),
        }];
        let annotations = Annotations::from_candidates(&candidates, "Contains money term");

        assert_eq!(annotations.bookmark_for(12).unwrap().note, "ስለ ገንዘብ");
        assert_eq!(
            annotations.note_for(12).unwrap().text,
            "Contains money term: ገንዘብ - ስለ ገንዘብ"
        );
        assert!(annotations.note_for(1).is_none());
    }
}
