// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Qalat recovery pipeline.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one recovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// OCR language identifier, passed through to the recognition engine
/// (Tesseract-style codes such as `amh`, `eng`, `amh+eng`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OcrLanguage(String);

impl OcrLanguage {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Amharic (Ge'ez script), the default for scanned books.
    pub fn amharic() -> Self {
        Self::new("amh")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OcrLanguage {
    fn default() -> Self {
        Self::amharic()
    }
}

impl std::fmt::Display for OcrLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text recovered for one physical page (1-based index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedPage {
    pub page_index: u32,
    pub text: String,
}

impl RecognizedPage {
    pub fn new(page_index: u32, text: impl Into<String>) -> Self {
        Self {
            page_index,
            text: text.into(),
        }
    }

    /// A page whose recognition failed or timed out.
    pub fn empty(page_index: u32) -> Self {
        Self::new(page_index, String::new())
    }
}

/// First keyword hit on a page, with its whitespace-normalised context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationCandidate {
    pub page_index: u32,
    pub keyword: String,
    pub snippet: String,
}

/// Reading-view bookmark derived from an annotation candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub page: u32,
    pub note: String,
}

/// Reading-view note derived from an annotation candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub page: u32,
    pub text: String,
}

/// Which route a recovery run takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMode {
    /// Text-layer extraction only.
    Direct,
    /// Rasterize and recognise every page.
    Ocr,
    /// Direct first, OCR when every extraction strategy fails.
    #[default]
    Auto,
}

impl std::fmt::Display for RecoveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Direct => "direct",
            Self::Ocr => "ocr",
            Self::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// Scale and rotation handed to a rasterizer at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterGeometry {
    /// Multiplier over the page's native 72 dpi size.
    pub scale: f32,
    /// Clockwise rotation in degrees, a multiple of 90.
    pub rotation: i32,
}

impl Default for RasterGeometry {
    fn default() -> Self {
        Self {
            scale: 2.0,
            rotation: 0,
        }
    }
}

/// Output paper sizes for the regenerated PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A5,
    Letter,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// How recognition went for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageStatus {
    Recognized,
    Failed { reason: String },
    TimedOut { after_ms: u64 },
}

/// Per-page entry in a [`RecoveryReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOutcome {
    pub page_index: u32,
    #[serde(flatten)]
    pub status: PageStatus,
    pub char_count: usize,
}

/// Summary of one recovery run, written next to the corpus on request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub run_id: RunId,
    pub source: PathBuf,
    /// SHA-256 of the source bytes (lowercase hex).
    pub source_sha256: String,
    pub requested_mode: RecoveryMode,
    /// `Direct` or `Ocr`; never `Auto`.
    pub mode_used: RecoveryMode,
    /// Winning strategy name when the direct path produced the corpus.
    pub extraction_strategy: Option<String>,
    pub page_count: u32,
    pub pages: Vec<PageOutcome>,
    pub corpus_path: PathBuf,
    pub pdf_path: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RecoveryReport {
    /// Pages whose recognition failed or timed out.
    pub fn degraded_pages(&self) -> Vec<u32> {
        self.pages
            .iter()
            .filter(|p| p.status != PageStatus::Recognized)
            .map(|p| p.page_index)
            .collect()
    }
}
