// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the qalat-document crate: scan preparation on a
// synthetic page and re-flowing a book-sized corpus into a PDF.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};

use qalat_core::config::ReflowSettings;
use qalat_document::{PageImage, PdfRegenerator, prepare_for_recognition};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Otsu binarization of a 600x800 page with dark text bars on light paper.
fn bench_prepare_for_recognition(c: &mut Criterion) {
    let (width, height) = (600u32, 800u32);
    let mut pixels = RgbImage::from_pixel(width, height, Rgb([235, 230, 220]));
    for line in 0..30 {
        let y0 = 40 + line * 24;
        for y in y0..y0 + 10 {
            for x in 50..550 {
                pixels.put_pixel(x, y, Rgb([35, 30, 30]));
            }
        }
    }
    let page = PageImage::new(1, 2.0, pixels);

    c.bench_function("prepare_for_recognition (600x800)", |b| {
        b.iter(|| prepare_for_recognition(black_box(page.clone())));
    });
}

/// Re-flow 200 pages of mixed Ge'ez and Latin text.
fn bench_regenerate_pdf(c: &mut Criterion) {
    let text: String = (1..=200)
        .map(|page| {
            format!(
                "\n\n-- Page {page} --\n\n{}",
                "ገንዘብ ብር ወርቅ price 50 ETB today. ".repeat(40)
            )
        })
        .collect();
    let regenerator = PdfRegenerator::new(ReflowSettings::default());

    c.bench_function("regenerate_pdf (200 pages)", |b| {
        b.iter(|| regenerator.render(black_box(&text)));
    });
}

criterion_group!(benches, bench_prepare_for_recognition, bench_regenerate_pdf);
criterion_main!(benches);
