// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// qalat-reader — Reading side of Qalat.
//
// Parses a corpus into pages, pages through it, and derives bookmarks and
// notes from keyword occurrences.

pub mod annotate;
pub mod paginator;

pub use annotate::{Annotations, KeywordAnnotator};
pub use paginator::Paginator;
