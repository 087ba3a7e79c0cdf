// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// qalat-document — Recovery side of Qalat.
//
// Turns a source PDF into a marker-delimited corpus: direct text-layer
// extraction through an ordered strategy chain, or page rasterization followed
// by OCR. Also regenerates a re-flowed PDF from the recovered text and writes
// every artifact atomically.

pub mod cancel;
pub mod extract;
pub mod output;
pub mod pdf;
pub mod pipeline;
pub mod raster;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the primary structs so callers can use `qalat_document::RecoveryPipeline` etc.
pub use cancel::CancelToken;
pub use extract::{Extraction, ExtractionStrategy, StrategyChain};
pub use pdf::source::SourceDocument;
pub use pdf::writer::PdfRegenerator;
pub use pipeline::{RecoveryPipeline, RecoveryRequest};
pub use raster::{PageImage, PageRasterizer};
pub use scan::{TesseractRecognizer, TextRecognizer, prepare_for_recognition};

#[cfg(feature = "render")]
pub use raster::mupdf::MupdfRasterizer;

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrsEngine;
