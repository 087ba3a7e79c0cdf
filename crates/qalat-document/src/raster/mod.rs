// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterization — turning one PDF page into a bitmap for OCR.

#[cfg(feature = "render")]
pub mod mupdf;

use image::{DynamicImage, ImageFormat, RgbImage};
use qalat_core::error::{QalatError, Result};

use crate::pdf::source::SourceDocument;

/// A rendered page, alive for exactly one recognition call.
#[derive(Debug, Clone)]
pub struct PageImage {
    page_index: u32,
    /// Scale the page was rendered at (1.0 = 72 dpi).
    scale: f32,
    pixels: RgbImage,
}

impl PageImage {
    pub fn new(page_index: u32, scale: f32, pixels: RgbImage) -> Self {
        Self {
            page_index,
            scale,
            pixels,
        }
    }

    /// 1-based index of the page this image shows.
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Replace the pixels, keeping page index and scale.
    pub fn map_pixels(self, f: impl FnOnce(RgbImage) -> RgbImage) -> Self {
        Self {
            pixels: f(self.pixels),
            ..self
        }
    }

    /// Encode as PNG, the format external OCR engines read.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        DynamicImage::ImageRgb8(self.pixels.clone())
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| QalatError::Image(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Renders pages of a [`SourceDocument`].
///
/// Geometry (scale, rotation) is fixed when the rasterizer is constructed.
/// Implementations must not keep page objects or buffers between calls.
pub trait PageRasterizer: Send + Sync {
    /// Number of pages this rasterizer can render. The OCR loop runs over
    /// exactly this many pages.
    fn page_count(&self, source: &SourceDocument) -> Result<u32> {
        Ok(source.page_count())
    }

    /// Render page `page_index` (1-based).
    ///
    /// # Errors
    ///
    /// [`QalatError::RasterizationFailed`] for out-of-range, corrupt, or
    /// undecodable pages.
    fn rasterize(&self, source: &SourceDocument, page_index: u32) -> Result<PageImage>;
}
