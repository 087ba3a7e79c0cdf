// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw content-stream walk — the last-resort text strategy.
//
// Decodes each page's content stream into operations and collects the string
// operands of the text-showing operators. Font encodings are ignored: strings
// with a UTF-16BE byte-order mark are decoded as UTF-16, everything else
// byte-wise as Latin-1. Crude, but it works on documents whose font
// dictionaries are too broken for the text-layer strategies.

use lopdf::Object;
use lopdf::content::Content;
use qalat_core::error::{QalatError, Result};
use tracing::debug;

use super::ExtractionStrategy;
use crate::pdf::source::SourceDocument;

/// TJ displacement (thousandths of an em) wide enough to read as a space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

pub struct ContentStreamStrategy;

impl ExtractionStrategy for ContentStreamStrategy {
    fn name(&self) -> &'static str {
        "raw-content-stream"
    }

    fn extract(&self, source: &SourceDocument) -> Result<String> {
        let document = source.decode()?;
        let pages = document.get_pages();
        if pages.is_empty() {
            return Err(QalatError::Pdf("document has no pages".into()));
        }

        let mut full_text = String::new();
        for (page_number, page_id) in pages {
            let data = document.get_page_content(page_id).map_err(|err| {
                QalatError::Pdf(format!("page {} has no readable content: {}", page_number, err))
            })?;
            let content = Content::decode(&data).map_err(|err| {
                QalatError::Pdf(format!(
                    "page {} content stream is malformed: {}",
                    page_number, err
                ))
            })?;

            let text = collect_text(&content);
            debug!(page_number, chars = text.chars().count(), "Content stream walked");
            full_text.push_str(text.trim_end());
            full_text.push_str("\n\n");
        }

        Ok(full_text)
    }
}

/// Concatenate the strings shown by text operators, breaking lines on
/// positioning operators and text-object ends.
fn collect_text(content: &Content) -> String {
    let mut out = String::new();

    for op in &content.operations {
        match op.operator.as_str() {
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    out.push_str(&decode_pdf_string(bytes));
                }
            }
            "'" => {
                newline(&mut out);
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    out.push_str(&decode_pdf_string(bytes));
                }
            }
            "\"" => {
                newline(&mut out);
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    out.push_str(&decode_pdf_string(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => out.push_str(&decode_pdf_string(bytes)),
                            Object::Integer(n) if -(*n as f32) > TJ_SPACE_THRESHOLD => {
                                out.push(' ')
                            }
                            Object::Real(n) if -*n > TJ_SPACE_THRESHOLD => out.push(' '),
                            _ => {}
                        }
                    }
                }
            }
            "Td" | "TD" | "T*" | "ET" => newline(&mut out),
            _ => {}
        }
    }

    out
}

/// Push a newline unless the buffer is empty or already ends a line.
fn newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Decode a PDF string operand without consulting font encodings.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use lopdf::StringFormat;
    use lopdf::content::Operation;

    use super::*;
    use crate::test_support::sample_pdf;

    fn string(text: &[u8]) -> Object {
        Object::String(text.to_vec(), StringFormat::Literal)
    }

    #[test]
    fn walks_every_page_in_order() {
        let source =
            SourceDocument::from_bytes(sample_pdf(&["First page", "Second page"]), "raw.pdf")
                .unwrap();
        let text = ContentStreamStrategy.extract(&source).unwrap();
        assert_eq!(text, "First page\n\nSecond page\n\n");
    }

    #[test]
    fn tj_arrays_honour_wide_gaps() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "TJ",
                    vec![Object::Array(vec![
                        string(b"Hel"),
                        Object::Integer(-20),
                        string(b"lo"),
                        Object::Integer(-400),
                        string(b"world"),
                    ])],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        assert_eq!(collect_text(&content), "Hello world\n");
    }

    #[test]
    fn positioning_operators_break_lines() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tj", vec![string(b"one")]),
                Operation::new("Td", vec![0.into(), (-14).into()]),
                Operation::new("Tj", vec![string(b"two")]),
                Operation::new("'", vec![string(b"three")]),
                Operation::new("ET", vec![]),
            ],
        };
        assert_eq!(collect_text(&content), "one\ntwo\nthree\n");
    }

    #[test]
    fn decodes_utf16_with_bom() {
        // "ብር" (U+1265 U+122D) as UTF-16BE with a byte-order mark.
        let bytes = [0xFE, 0xFF, 0x12, 0x65, 0x12, 0x2D];
        assert_eq!(decode_pdf_string(&bytes), "ብር");
    }

    #[test]
    fn decodes_plain_bytes_as_latin1() {
        assert_eq!(decode_pdf_string(b"caf\xe9"), "café");
    }
}
