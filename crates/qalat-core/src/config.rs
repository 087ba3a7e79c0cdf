// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline and reader configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{QalatError, Result};
use crate::types::{OcrLanguage, PaperSize, RasterGeometry};

/// Settings for one Qalat installation. Every section has defaults, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QalatConfig {
    pub ocr: OcrSettings,
    pub raster: RasterGeometry,
    pub reflow: ReflowSettings,
    pub annotation: AnnotationSettings,
}

/// Recognition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub language: OcrLanguage,
    /// Per-page recognition budget. `None` waits indefinitely.
    pub page_timeout_secs: Option<u64>,
    /// Grayscale + Otsu binarization before recognition.
    pub binarize: bool,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: OcrLanguage::amharic(),
            page_timeout_secs: None,
            binarize: false,
        }
    }
}

/// Layout of the regenerated PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflowSettings {
    pub lines_per_page: usize,
    pub font_size_pt: f32,
    pub margin_pt: f32,
    pub paper: PaperSize,
}

impl Default for ReflowSettings {
    fn default() -> Self {
        Self {
            lines_per_page: 40,
            font_size_pt: 12.0,
            margin_pt: 50.0,
            paper: PaperSize::A4,
        }
    }
}

/// Keyword scan used to derive bookmarks and notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationSettings {
    /// Searched in order; the first hit on a page wins.
    pub keywords: Vec<String>,
    /// Characters kept before the match start.
    pub before: usize,
    /// Characters kept after the match end.
    pub after: usize,
    /// Prefix of every generated note.
    pub note_label: String,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            // money, birr, gold
            keywords: vec!["ገንዘብ".into(), "ብር".into(), "ወርቅ".into()],
            before: 40,
            after: 80,
            note_label: "Contains money term".into(),
        }
    }
}

impl QalatConfig {
    /// Load a JSON config file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        debug!(language = %config.ocr.language, "config loaded");
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.ocr.language.as_str().trim().is_empty() {
            return Err(QalatError::Config("ocr.language must not be empty".into()));
        }
        if self.ocr.page_timeout_secs == Some(0) {
            return Err(QalatError::Config(
                "ocr.page_timeout_secs must be positive".into(),
            ));
        }
        if !self.raster.scale.is_finite() || self.raster.scale <= 0.0 {
            return Err(QalatError::Config(format!(
                "raster.scale must be positive, got {}",
                self.raster.scale
            )));
        }
        if self.raster.rotation % 90 != 0 {
            return Err(QalatError::Config(format!(
                "raster.rotation must be a multiple of 90, got {}",
                self.raster.rotation
            )));
        }
        if self.reflow.lines_per_page == 0 {
            return Err(QalatError::Config(
                "reflow.lines_per_page must be at least 1".into(),
            ));
        }
        if self.annotation.keywords.iter().any(|k| k.is_empty()) {
            return Err(QalatError::Config(
                "annotation.keywords must not contain empty strings".into(),
            ));
        }
        Ok(())
    }
}
