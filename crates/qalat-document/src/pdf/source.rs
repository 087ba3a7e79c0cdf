// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source document — an immutable, cheaply cloneable handle on the input PDF
// using the `lopdf` crate for structure and page counting.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lopdf::Document;
use qalat_core::error::{QalatError, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

/// The PDF a recovery run reads from.
///
/// Holds the raw bytes behind an `Arc` so that extraction attempts and the
/// rasterizer can each decode their own copy without re-reading the file.
/// Nothing in the pipeline mutates it.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Where the document came from (used in logs and reports).
    path: PathBuf,
    /// The undecoded file contents.
    bytes: Arc<Vec<u8>>,
    /// Page count from the page tree, fixed at open time.
    page_count: u32,
}

impl SourceDocument {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening source PDF: {}", path_ref.display());

        let bytes = std::fs::read(path_ref).map_err(|err| {
            QalatError::Pdf(format!("failed to read {}: {}", path_ref.display(), err))
        })?;

        Self::from_bytes(bytes, path_ref)
    }

    /// Wrap PDF bytes already in memory. `path` only labels the document.
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn from_bytes(bytes: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = Document::load_mem(&bytes).map_err(|err| {
            QalatError::Pdf(format!("failed to parse {}: {}", path.display(), err))
        })?;
        let page_count = document.get_pages().len() as u32;

        debug!(pages = page_count, "Source PDF loaded");

        Ok(Self {
            path,
            bytes: Arc::new(bytes),
            page_count,
        })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in the document's page tree.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// SHA-256 of the raw file contents, lowercase hex.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.bytes.as_slice()))
    }

    // -- Decoding -------------------------------------------------------------

    /// Decode a fresh `lopdf::Document` owned by the caller.
    ///
    /// Each extraction attempt calls this, so a failing attempt never leaves a
    /// half-processed document behind for the next one.
    pub fn decode(&self) -> Result<Document> {
        Document::load_mem(&self.bytes).map_err(|err| {
            QalatError::Pdf(format!("failed to parse {}: {}", self.path.display(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_pdf;

    #[test]
    fn counts_pages_from_page_tree() {
        let bytes = sample_pdf(&["one", "two", "three"]);
        let source = SourceDocument::from_bytes(bytes, "memory.pdf").unwrap();
        assert_eq!(source.page_count(), 3);
        assert_eq!(source.path(), Path::new("memory.pdf"));
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let result = SourceDocument::from_bytes(b"not a pdf".to_vec(), "junk.pdf");
        assert!(matches!(result, Err(QalatError::Pdf(_))));
    }

    #[test]
    fn open_missing_file_fails() {
        let result = SourceDocument::open("/nonexistent/qalat/source.pdf");
        assert!(matches!(result, Err(QalatError::Pdf(_))));
    }

    #[test]
    fn fingerprint_is_sha256_of_file_bytes() {
        let bytes = sample_pdf(&["x"]);
        let expected = hex::encode(Sha256::digest(&bytes));
        let source = SourceDocument::from_bytes(bytes, "x.pdf").unwrap();
        assert_eq!(source.fingerprint(), expected);
        assert_eq!(source.fingerprint().len(), 64);
    }

    #[test]
    fn clones_share_bytes() {
        let source = SourceDocument::from_bytes(sample_pdf(&["x"]), "x.pdf").unwrap();
        let clone = source.clone();
        assert_eq!(source.bytes().as_ptr(), clone.bytes().as_ptr());
        assert_eq!(source.fingerprint(), clone.fingerprint());
    }
}
