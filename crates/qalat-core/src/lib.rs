// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Qalat — Core types, errors, configuration, and the corpus page-marker format
// shared by the recovery pipeline and the reading side.

pub mod config;
pub mod corpus;
pub mod error;
pub mod types;

pub use config::QalatConfig;
pub use corpus::Corpus;
pub use error::QalatError;
pub use types::*;
