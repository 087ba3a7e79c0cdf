// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page cursor over a parsed corpus.

use qalat_core::corpus::{Corpus, parse_pages};
use qalat_core::error::{QalatError, Result};
use tracing::debug;

/// A 1-based cursor over corpus pages.
///
/// A paginator with pages always points at a valid page, starting at page 1.
/// An empty paginator reports page 0 and 0% progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    pages: Vec<String>,
    current: u32,
}

impl Paginator {
    pub fn new(pages: Vec<String>) -> Self {
        let current = u32::from(!pages.is_empty());
        Self { pages, current }
    }

    /// Parse marker-delimited (or plain) corpus text.
    pub fn from_corpus_text(text: &str) -> Self {
        let pages = parse_pages(text);
        debug!(pages = pages.len(), "Corpus paginated");
        Self::new(pages)
    }

    pub fn from_corpus(corpus: Corpus) -> Self {
        Self::new(corpus.into_pages().into_iter().map(|p| p.text).collect())
    }

    /// The 0-indexed page list backing this cursor.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn total_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Current 1-based page, or 0 when there are no pages.
    pub fn current_page(&self) -> u32 {
        self.current
    }

    pub fn current_text(&self) -> Option<&str> {
        self.page_text(self.current)
    }

    /// Text of a 1-based page.
    pub fn page_text(&self, page: u32) -> Option<&str> {
        let index = page.checked_sub(1)? as usize;
        self.pages.get(index).map(String::as_str)
    }

    /// Advance one page. Returns `false` on the last page.
    pub fn next(&mut self) -> bool {
        if self.current < self.total_pages() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns `false` on the first page.
    pub fn previous(&mut self) -> bool {
        if self.current > 1 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a 1-based page.
    pub fn go_to(&mut self, page: u32) -> Result<()> {
        let total = self.total_pages();
        if page == 0 || page > total {
            return Err(QalatError::PageOutOfRange { page, total });
        }
        self.current = page;
        Ok(())
    }

    /// `current / total * 100`, rounded to the nearest integer.
    pub fn progress_percent(&self) -> u32 {
        let total = self.total_pages();
        if total == 0 {
            return 0;
        }
        (f64::from(self.current) / f64::from(total) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Paginator {
        Paginator::from_corpus_text(
            "-- Page 1 --\n\nHello world\n\n-- Page 2 --\n\nPrice is 50 ETB today\n\n-- Page 3 --\n\nend",
        )
    }

    #[test]
    fn starts_on_first_page() {
        let pager = book();
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.current_page(), 1);
        assert_eq!(pager.current_text(), Some("Hello world"));
    }

    #[test]
    fn next_and_previous_stop_at_the_ends() {
        let mut pager = book();
        assert!(!pager.previous());
        assert!(pager.next());
        assert!(pager.next());
        assert!(!pager.next());
        assert_eq!(pager.current_page(), 3);
        assert!(pager.previous());
        assert_eq!(pager.current_text(), Some("Price is 50 ETB today"));
    }

    #[test]
    fn go_to_rejects_out_of_range_pages() {
        let mut pager = book();
        pager.go_to(3).unwrap();
        assert_eq!(pager.current_text(), Some("end"));
        assert!(matches!(
            pager.go_to(4),
            Err(QalatError::PageOutOfRange { page: 4, total: 3 })
        ));
        assert!(pager.go_to(0).is_err());
        assert_eq!(pager.current_page(), 3);
    }

    #[test]
    fn progress_is_rounded() {
        let mut pager = book();
        assert_eq!(pager.progress_percent(), 33);
        pager.next();
        assert_eq!(pager.progress_percent(), 67);
        pager.next();
        assert_eq!(pager.progress_percent(), 100);
    }

    #[test]
    fn empty_corpus_has_no_current_page() {
        let mut pager = Paginator::from_corpus_text("  \n ");
        assert_eq!(pager.total_pages(), 0);
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.current_text(), None);
        assert_eq!(pager.progress_percent(), 0);
        assert!(!pager.next());
        assert!(pager.go_to(1).is_err());
    }

    #[test]
    fn plain_text_is_a_single_page() {
        let pager = Paginator::from_corpus_text("extracted text without markers\n");
        assert_eq!(pager.total_pages(), 1);
        assert_eq!(pager.progress_percent(), 100);
    }
}
