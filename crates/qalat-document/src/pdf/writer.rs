// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF regenerator — re-flow recovered text into a new, plain PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.
//
// The output is not layout faithful. Text is wrapped to the printable width,
// then cut into pages of a fixed maximum line count.

use printpdf::{BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem};
use qalat_core::config::ReflowSettings;
use qalat_core::error::Result;
use tracing::{debug, info, instrument, warn};

/// The one typeface every regenerated page uses.
const FONT: BuiltinFont = BuiltinFont::TimesRoman;

/// Builds re-flowed PDFs from corpus text.
pub struct PdfRegenerator {
    settings: ReflowSettings,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

/// Serialised PDF plus the number of pages it contains.
#[derive(Debug, Clone)]
pub struct RegeneratedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl PdfRegenerator {
    pub fn new(settings: ReflowSettings) -> Self {
        Self {
            settings,
            title: "Recovered text".to_string(),
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.settings.paper.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Characters that fit on one line at the configured font size.
    fn max_chars_per_line(&self) -> usize {
        let (page_w, _) = self.page_dimensions();
        let usable_width_pt = page_w.into_pt().0 - 2.0 * self.settings.margin_pt;
        // Average Times glyph width is roughly half the font size.
        let avg_char_width_pt = 0.5 * self.settings.font_size_pt;
        ((usable_width_pt / avg_char_width_pt) as usize).max(1)
    }

    /// Wrap `text` and cut it into page-sized chunks of lines.
    pub fn paginate(&self, text: &str) -> Vec<Vec<String>> {
        let lines = wrap_text(text, self.max_chars_per_line());
        lines
            .chunks(self.settings.lines_per_page.max(1))
            .map(<[String]>::to_vec)
            .collect()
    }

    /// Render `text` as a re-flowed PDF.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn render(&self, text: &str) -> Result<RegeneratedPdf> {
        let (page_w, page_h) = self.page_dimensions();
        info!(
            paper = ?self.settings.paper,
            lines_per_page = self.settings.lines_per_page,
            "Regenerating PDF"
        );

        let font_size = self.settings.font_size_pt;
        let line_height = font_size * 1.2;
        let margin = self.settings.margin_pt;
        let page_h_pt = page_h.into_pt().0;

        let chunks = self.paginate(text);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(chunks.len().max(1));

        for chunk in &chunks {
            let mut ops: Vec<Op> = Vec::with_capacity(chunk.len() * 5);

            for (line_idx, line) in chunk.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                // Top-left of the page, moving downward; the first baseline
                // sits one font size below the top margin.
                let y_pt = page_h_pt - margin - font_size - (line_idx as f32 * line_height);

                ops.push(Op::StartTextSection);
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(margin),
                        y: Pt(y_pt),
                    },
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(font_size),
                    font: FONT,
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(line.clone())],
                    font: FONT,
                });
                ops.push(Op::EndTextSection);
            }

            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        // No text at all still yields a valid, single blank page.
        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let page_count = pages.len();
        let mut doc = PdfDocument::new(&self.title);
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings while saving");
        }

        debug!(page_count, output_bytes = bytes.len(), "PDF regenerated");
        Ok(RegeneratedPdf { bytes, page_count })
    }
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Widths count Unicode scalar values, so Ge'ez text (three bytes per
/// character in UTF-8) wraps at the same visual width as Latin text. Existing
/// newlines are kept; words longer than `max_width` are force-broken.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_width = 0usize;

        for word in words {
            let word_width = word.chars().count();

            if word_width > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let chars: Vec<char> = word.chars().collect();
                let mut pieces = chars.chunks(max_width).peekable();
                while let Some(piece) = pieces.next() {
                    if pieces.peek().is_some() {
                        result.push(piece.iter().collect());
                    } else {
                        current_line = piece.iter().collect();
                        current_width = piece.len();
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_width = word_width;
            } else if current_width + 1 + word_width <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_width += 1 + word_width;
            } else {
                result.push(std::mem::replace(&mut current_line, word.to_string()));
                current_width = word_width;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(lines_per_page: usize) -> ReflowSettings {
        ReflowSettings {
            lines_per_page,
            ..ReflowSettings::default()
        }
    }

    #[test]
    fn wrap_keeps_short_lines_and_blank_lines() {
        let lines = wrap_text("one two\n\nthree", 20);
        assert_eq!(lines, vec!["one two", "", "three"]);
    }

    #[test]
    fn wrap_breaks_at_word_boundaries() {
        let lines = wrap_text("aaa bbb ccc", 7);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn wrap_counts_characters_not_bytes() {
        // Six Ge'ez characters, eighteen bytes.
        let lines = wrap_text("ገንዘብ ብር", 6);
        assert_eq!(lines, vec!["ገንዘብ", "ብር"]);
    }

    #[test]
    fn wrap_force_breaks_long_words_on_char_boundaries() {
        let lines = wrap_text("ሀሁሂሃሄህሆ", 3);
        assert_eq!(lines, vec!["ሀሁሂ", "ሃሄህ", "ሆ"]);
    }

    #[test]
    fn paginate_respects_line_budget() {
        let text: String = (1..=100).map(|i| format!("line {i}\n")).collect();
        let regenerator = PdfRegenerator::new(settings(40));
        let chunks = regenerator.paginate(text.trim_end());
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 40);
        assert_eq!(chunks[2].len(), 20);
        assert!(chunks.iter().all(|c| c.len() <= 40));
    }

    #[test]
    fn render_page_count_matches_chunks() {
        let text: String = (1..=81).map(|i| format!("line {i}\n")).collect();
        let regenerator = PdfRegenerator::new(settings(40));
        let pdf = regenerator.render(text.trim_end()).unwrap();
        assert_eq!(pdf.page_count, 3);
        assert!(pdf.bytes.starts_with(b"%PDF"));

        let reparsed = lopdf::Document::load_mem(&pdf.bytes).unwrap();
        assert_eq!(reparsed.get_pages().len(), 3);
    }

    #[test]
    fn empty_text_renders_one_blank_page() {
        let regenerator = PdfRegenerator::new(settings(40));
        let pdf = regenerator.render("").unwrap();
        assert_eq!(pdf.page_count, 1);
    }
}
