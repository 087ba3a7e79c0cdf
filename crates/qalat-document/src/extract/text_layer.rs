// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text-layer strategies built on lopdf's font-aware text extraction.

use lopdf::Document;
use qalat_core::error::{QalatError, Result};
use tracing::debug;

use super::ExtractionStrategy;
use crate::pdf::source::SourceDocument;

/// Decode the source and list its page numbers, refusing documents lopdf
/// cannot read text from.
fn readable_pages(source: &SourceDocument) -> Result<(Document, Vec<u32>)> {
    let document = source.decode()?;
    if document.is_encrypted() {
        return Err(QalatError::Pdf("document is encrypted".into()));
    }
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return Err(QalatError::Pdf("document has no pages".into()));
    }
    Ok((document, pages))
}

/// Whole-document extraction in one lopdf call.
pub struct DocumentTextLayer;

impl ExtractionStrategy for DocumentTextLayer {
    fn name(&self) -> &'static str {
        "text-layer-document"
    }

    fn extract(&self, source: &SourceDocument) -> Result<String> {
        let (document, pages) = readable_pages(source)?;
        document
            .extract_text(&pages)
            .map_err(|err| QalatError::Pdf(format!("text extraction failed: {}", err)))
    }
}

/// Page-by-page extraction, pages separated by a blank line.
///
/// Slower than [`DocumentTextLayer`] but reports which page broke.
pub struct PageTextLayer;

impl ExtractionStrategy for PageTextLayer {
    fn name(&self) -> &'static str {
        "text-layer-per-page"
    }

    fn extract(&self, source: &SourceDocument) -> Result<String> {
        let (document, pages) = readable_pages(source)?;
        let mut full_text = String::new();

        for page in pages {
            let text = document.extract_text(&[page]).map_err(|err| {
                QalatError::Pdf(format!("text extraction failed on page {}: {}", page, err))
            })?;
            debug!(page, chars = text.chars().count(), "Page text extracted");
            full_text.push_str(text.trim_end());
            full_text.push_str("\n\n");
        }

        Ok(full_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_pdf;

    #[test]
    fn per_page_text_contains_every_page() {
        let source =
            SourceDocument::from_bytes(sample_pdf(&["Alpha", "Beta"]), "layer.pdf").unwrap();
        let text = PageTextLayer.extract(&source).unwrap();
        assert!(text.contains("Alpha"));
        assert!(text.contains("Beta"));
        assert!(text.find("Alpha") < text.find("Beta"));
    }

    #[test]
    fn document_layer_reads_text() {
        let source = SourceDocument::from_bytes(sample_pdf(&["Hello"]), "layer.pdf").unwrap();
        let text = DocumentTextLayer.extract(&source).unwrap();
        assert!(text.contains("Hello"));
    }
}
