// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Direct text extraction — an ordered chain of strategies, each reading the
// PDF's text layer a different way. The first strategy that returns `Ok` wins;
// nothing judges whether its text is any good. Callers that need better
// fidelity route the document through OCR instead.

pub mod content_stream;
pub mod text_layer;

use qalat_core::error::{QalatError, Result};
use tracing::{debug, info, instrument, warn};

use crate::pdf::source::SourceDocument;

pub use content_stream::ContentStreamStrategy;
pub use text_layer::{DocumentTextLayer, PageTextLayer};

/// One way of pulling text out of a PDF without OCR.
pub trait ExtractionStrategy: Send + Sync {
    /// Stable name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Extract the whole document's text. Implementations decode the source
    /// themselves and must not write anything.
    fn extract(&self, source: &SourceDocument) -> Result<String>;
}

/// A strategy's slot in the chain (lower priority runs first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionAttempt {
    pub name: &'static str,
    pub priority: usize,
}

/// Text produced by the winning strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub strategy: &'static str,
    pub text: String,
}

/// Ordered list of extraction strategies.
pub struct StrategyChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for StrategyChain {
    /// Fastest and most specific first, raw content-stream walk last.
    fn default() -> Self {
        Self::new(vec![
            Box::new(DocumentTextLayer),
            Box::new(PageTextLayer),
            Box::new(ContentStreamStrategy),
        ])
    }
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// The attempts in the order they will run.
    pub fn attempts(&self) -> Vec<ExtractionAttempt> {
        self.strategies
            .iter()
            .enumerate()
            .map(|(priority, s)| ExtractionAttempt {
                name: s.name(),
                priority,
            })
            .collect()
    }

    /// Run strategies in order and return the first success.
    ///
    /// # Errors
    ///
    /// [`QalatError::ExtractionExhausted`] listing every failure when no
    /// strategy succeeds (including an empty chain).
    #[instrument(skip_all, fields(path = %source.path().display()))]
    pub fn extract(&self, source: &SourceDocument) -> Result<Extraction> {
        let mut failures = Vec::with_capacity(self.strategies.len());

        for (priority, strategy) in self.strategies.iter().enumerate() {
            debug!(strategy = strategy.name(), priority, "Trying extraction strategy");
            match strategy.extract(source) {
                Ok(text) => {
                    info!(
                        strategy = strategy.name(),
                        chars = text.chars().count(),
                        "Extraction succeeded"
                    );
                    return Ok(Extraction {
                        strategy: strategy.name(),
                        text,
                    });
                }
                Err(err) => {
                    warn!(strategy = strategy.name(), %err, "Extraction strategy failed");
                    failures.push(format!("{}: {}", strategy.name(), err));
                }
            }
        }

        Err(QalatError::ExtractionExhausted { attempts: failures })
    }
}
