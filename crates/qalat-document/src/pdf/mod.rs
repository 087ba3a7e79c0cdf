// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — opening source documents and regenerating re-flowed PDFs.

pub mod source;
pub mod writer;

pub use source::SourceDocument;
pub use writer::PdfRegenerator;
