// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MuPDF-backed rasterizer.
//
// MuPDF documents are not thread-safe, so nothing MuPDF-owned outlives a call:
// every `rasterize` opens a fresh document from the shared source bytes,
// renders one page, copies the pixels out, and drops the rest.

use image::RgbImage;
use mupdf::{Colorspace, Document, Matrix, Pixmap};
use qalat_core::error::{QalatError, Result};
use qalat_core::types::RasterGeometry;
use tracing::{debug, instrument};

use super::{PageImage, PageRasterizer};
use crate::pdf::source::SourceDocument;

const PDF_MAGIC: &str = "application/pdf";

/// Renders pages with MuPDF at a fixed, injected geometry.
#[derive(Debug, Clone)]
pub struct MupdfRasterizer {
    geometry: RasterGeometry,
}

impl MupdfRasterizer {
    pub fn new(geometry: RasterGeometry) -> Self {
        Self { geometry }
    }

    /// Page transform: scale first, then rotate.
    fn matrix(&self) -> Matrix {
        let mut matrix = Matrix::new_scale(self.geometry.scale, self.geometry.scale);
        if self.geometry.rotation != 0 {
            matrix.concat(Matrix::new_rotate(self.geometry.rotation as f32));
        }
        matrix
    }

    fn open(source: &SourceDocument) -> std::result::Result<Document, mupdf::Error> {
        Document::from_bytes(source.bytes(), PDF_MAGIC)
    }
}

impl Default for MupdfRasterizer {
    fn default() -> Self {
        Self::new(RasterGeometry::default())
    }
}

impl PageRasterizer for MupdfRasterizer {
    fn page_count(&self, source: &SourceDocument) -> Result<u32> {
        let document = Self::open(source)
            .map_err(|err| QalatError::Pdf(format!("MuPDF cannot open document: {}", err)))?;
        let count = document
            .page_count()
            .map_err(|err| QalatError::Pdf(format!("MuPDF page count failed: {}", err)))?;
        Ok(count.max(0) as u32)
    }

    #[instrument(skip(self, source), fields(scale = self.geometry.scale))]
    fn rasterize(&self, source: &SourceDocument, page_index: u32) -> Result<PageImage> {
        let failed = |reason: String| QalatError::RasterizationFailed {
            page: page_index,
            reason,
        };

        if page_index == 0 {
            return Err(failed("page indices start at 1".into()));
        }

        let document = Self::open(source).map_err(|err| failed(err.to_string()))?;
        let page = document
            .load_page(page_index as i32 - 1)
            .map_err(|err| failed(format!("cannot load page: {}", err)))?;
        let pixmap = page
            .to_pixmap(&self.matrix(), &Colorspace::device_rgb(), false, true)
            .map_err(|err| failed(format!("render failed: {}", err)))?;

        let pixels = pixmap_to_rgb(&pixmap).ok_or_else(|| failed("pixmap has no RGB samples".into()))?;
        debug!(width = pixels.width(), height = pixels.height(), "Page rasterized");

        Ok(PageImage::new(page_index, self.geometry.scale, pixels))
    }
}

/// Copy pixmap samples into an owned RGB buffer, dropping any alpha channel.
fn pixmap_to_rgb(pixmap: &Pixmap) -> Option<RgbImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let n = pixmap.n() as usize;
    if n < 3 {
        return None;
    }

    let samples = pixmap.samples();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for pixel in samples.chunks_exact(n).take((width * height) as usize) {
        rgb.extend_from_slice(&pixel[..3]);
    }

    RgbImage::from_raw(width, height, rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_pdf;

    fn source(pages: &[&str]) -> SourceDocument {
        SourceDocument::from_bytes(sample_pdf(pages), "sample.pdf").unwrap()
    }

    #[test]
    fn default_scale_doubles_page_size() {
        let source = source(&["first", "second"]);
        let image = MupdfRasterizer::default().rasterize(&source, 2).unwrap();

        assert_eq!(image.page_index(), 2);
        assert_eq!(image.scale(), 2.0);
        assert_eq!((image.width(), image.height()), (2 * 595, 2 * 842));
    }

    #[test]
    fn rendered_text_leaves_ink() {
        let source = source(&["HELLO HELLO HELLO"]);
        let image = MupdfRasterizer::default().rasterize(&source, 1).unwrap();
        assert!(image.pixels().pixels().any(|p| p.0.iter().all(|&c| c < 128)));
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let source = source(&["a"]);
        let rasterizer = MupdfRasterizer::new(RasterGeometry {
            scale: 1.0,
            rotation: 90,
        });
        let image = rasterizer.rasterize(&source, 1).unwrap();
        assert_eq!((image.width(), image.height()), (842, 595));
    }

    #[test]
    fn page_zero_and_past_the_end_fail() {
        let source = source(&["a", "b", "c"]);
        let rasterizer = MupdfRasterizer::default();

        assert!(matches!(
            rasterizer.rasterize(&source, 0),
            Err(QalatError::RasterizationFailed { page: 0, .. })
        ));
        assert!(matches!(
            rasterizer.rasterize(&source, 4),
            Err(QalatError::RasterizationFailed { page: 4, .. })
        ));
    }

    #[test]
    fn page_count_matches_lopdf() {
        let source = source(&["a", "b", "c"]);
        assert_eq!(MupdfRasterizer::default().page_count(&source).unwrap(), 3);
    }

    #[test]
    fn alpha_channel_is_dropped() {
        let source = source(&["a"]);
        let document = MupdfRasterizer::open(&source).unwrap();
        let page = document.load_page(0).unwrap();
        let pixmap = page
            .to_pixmap(&Matrix::new_scale(0.5, 0.5), &Colorspace::device_rgb(), true, true)
            .unwrap();
        assert_eq!(pixmap.n(), 4);

        let rgb = pixmap_to_rgb(&pixmap).unwrap();
        assert_eq!(rgb.width(), pixmap.width() as u32);
        assert_eq!(rgb.as_raw().len(), (rgb.width() * rgb.height() * 3) as usize);
    }
}
