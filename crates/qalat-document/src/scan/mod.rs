// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition side of the pipeline: scan preparation and optical character
// recognition (OCR) over rasterized pages.

pub mod prepare;
pub mod tesseract;

#[cfg(feature = "ocr")]
pub mod ocr;

use qalat_core::error::Result;
use qalat_core::types::OcrLanguage;

use crate::raster::PageImage;

pub use prepare::prepare_for_recognition;
pub use tesseract::TesseractRecognizer;

#[cfg(feature = "ocr")]
pub use ocr::OcrsEngine;

/// Turns one page image into text.
///
/// Called once per page, strictly in page order. A returned error is treated
/// by the pipeline as a non-fatal, empty page.
pub trait TextRecognizer: Send + Sync {
    /// Engine name for logs and reports.
    fn name(&self) -> &str;

    fn recognize(&self, image: &PageImage, language: &OcrLanguage) -> Result<String>;
}
