// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Qalat.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Qalat operations.
#[derive(Debug, Error)]
pub enum QalatError {
    // -- Extraction --
    #[error("every extraction strategy failed: {}", attempts.join("; "))]
    ExtractionExhausted { attempts: Vec<String> },

    // -- Rasterization / recognition --
    #[error("rasterization failed on page {page}: {reason}")]
    RasterizationFailed { page: u32, reason: String },

    /// Non-fatal at page granularity: the pipeline records an empty page.
    #[error("recognition failed on page {page}: {reason}")]
    RecognitionFailed { page: u32, reason: String },

    #[error("OCR engine unavailable: {0}")]
    OcrEngine(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Corpus --
    #[error("failed to write {}: {reason}", path.display())]
    CorpusWriteFailed { path: PathBuf, reason: String },

    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),

    #[error("page {page} is out of range (1..={total})")]
    PageOutOfRange { page: u32, total: u32 },

    // -- Run control --
    #[error("recovery run cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0} support was not compiled into this build")]
    Unavailable(&'static str),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QalatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_lists_every_attempt() {
        let err = QalatError::ExtractionExhausted {
            attempts: vec![
                "text-layer-document: encrypted".into(),
                "raw-content-stream: no pages".into(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("text-layer-document: encrypted"));
        assert!(msg.contains("raw-content-stream: no pages"));
    }
}
