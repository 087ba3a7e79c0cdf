// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan preparation — grayscale conversion and global Otsu binarization ahead
// of recognition.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use tracing::{debug, instrument};

use crate::raster::PageImage;

/// Grayscale + Otsu binarization, returned as an RGB page so every recognizer
/// sees the same pixel format.
#[instrument(skip_all, fields(page = image.page_index()))]
pub fn prepare_for_recognition(image: PageImage) -> PageImage {
    image.map_pixels(|pixels| {
        let gray = DynamicImage::ImageRgb8(pixels).to_luma8();
        let binary = binarize_otsu(&gray);
        DynamicImage::ImageLuma8(binary).to_rgb8()
    })
}

/// Pixels darker than the Otsu level become black, everything else white.
fn binarize_otsu(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    debug!(level, "Otsu threshold computed");

    let mut output = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel.0[0] <= level { 0u8 } else { 255u8 };
        output.put_pixel(x, y, Luma([value]));
    }
    output
}
