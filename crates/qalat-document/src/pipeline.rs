// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recovery pipeline — one run from source PDF to published corpus.
//
// Direct path: the strategy chain produces the text, which is published
// verbatim. OCR path: every page is rasterized and recognized in order; a page
// whose recognition fails or times out is recorded with empty text, while a
// rasterization failure aborts the run. Nothing is published until all pages
// are done, so a failed or cancelled run leaves no output behind.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use qalat_core::config::QalatConfig;
use qalat_core::corpus::Corpus;
use qalat_core::error::{QalatError, Result};
use qalat_core::types::{
    PageOutcome, PageStatus, RecognizedPage, RecoveryMode, RecoveryReport, RunId,
};
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelToken;
use crate::extract::{Extraction, StrategyChain};
use crate::output;
use crate::pdf::source::SourceDocument;
use crate::pdf::writer::{PdfRegenerator, RegeneratedPdf};
use crate::raster::PageRasterizer;
use crate::scan::{TextRecognizer, prepare_for_recognition};

/// What to recover and where to put it.
#[derive(Debug, Clone)]
pub struct RecoveryRequest {
    pub source: PathBuf,
    pub corpus_path: PathBuf,
    /// Also publish a re-flowed PDF here.
    pub pdf_path: Option<PathBuf>,
    pub mode: RecoveryMode,
}

impl RecoveryRequest {
    pub fn new(source: impl Into<PathBuf>, corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            corpus_path: corpus_path.into(),
            pdf_path: None,
            mode: RecoveryMode::default(),
        }
    }

    pub fn with_pdf(mut self, pdf_path: impl Into<PathBuf>) -> Self {
        self.pdf_path = Some(pdf_path.into());
        self
    }

    pub fn with_mode(mut self, mode: RecoveryMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Rasterizer + recognizer pair used by the OCR path.
#[derive(Clone)]
struct OcrStage {
    rasterizer: Arc<dyn PageRasterizer>,
    recognizer: Arc<dyn TextRecognizer>,
}

/// Text recovered by one route, before anything is published.
enum Recovered {
    Direct {
        extraction: Extraction,
    },
    Ocr {
        corpus: Corpus,
        outcomes: Vec<PageOutcome>,
    },
}

impl Recovered {
    fn corpus_text(&self) -> String {
        match self {
            Self::Direct { extraction } => extraction.text.clone(),
            Self::Ocr { corpus, .. } => corpus.to_text(),
        }
    }
}

/// Drives a recovery run.
pub struct RecoveryPipeline {
    config: QalatConfig,
    chain: Arc<StrategyChain>,
    ocr: Option<OcrStage>,
    page_timeout: Option<Duration>,
}

impl RecoveryPipeline {
    /// Default strategy chain, no OCR stage, page timeout from `config`.
    pub fn new(config: QalatConfig) -> Self {
        let page_timeout = config.ocr.page_timeout_secs.map(Duration::from_secs);
        Self {
            config,
            chain: Arc::new(StrategyChain::default()),
            ocr: None,
            page_timeout,
        }
    }

    pub fn with_strategy_chain(mut self, chain: StrategyChain) -> Self {
        self.chain = Arc::new(chain);
        self
    }

    /// Enable the OCR path.
    pub fn with_ocr(
        mut self,
        rasterizer: Arc<dyn PageRasterizer>,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Self {
        self.ocr = Some(OcrStage {
            rasterizer,
            recognizer,
        });
        self
    }

    pub fn with_page_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn config(&self) -> &QalatConfig {
        &self.config
    }

    /// Run one recovery and publish its artifacts.
    ///
    /// # Errors
    ///
    /// - [`QalatError::ExtractionExhausted`] when the direct path fails (in
    ///   `auto` mode only when no OCR stage is configured).
    /// - [`QalatError::RasterizationFailed`] if any page cannot be rendered.
    /// - [`QalatError::Cancelled`] if `cancel` fires before publishing.
    /// - [`QalatError::CorpusWriteFailed`] if an artifact cannot be written.
    ///
    /// Recognition failures and timeouts are not errors; they show up as
    /// degraded pages in the returned report.
    #[instrument(skip_all, fields(source = %request.source.display(), mode = %request.mode))]
    pub async fn run(&self, request: &RecoveryRequest, cancel: &CancelToken) -> Result<RecoveryReport> {
        let run_id = RunId::new();
        let started_at = Utc::now();
        info!(%run_id, "Recovery started");

        let path = request.source.clone();
        let source = blocking(move || SourceDocument::open(path)).await?;
        check_cancelled(cancel)?;

        let recovered = match request.mode {
            RecoveryMode::Direct => Recovered::Direct {
                extraction: self.extract_direct(&source).await?,
            },
            RecoveryMode::Ocr => self.recognize_pages(&source, cancel).await?,
            RecoveryMode::Auto => match self.extract_direct(&source).await {
                Ok(extraction) => Recovered::Direct { extraction },
                Err(QalatError::ExtractionExhausted { attempts }) if self.ocr.is_some() => {
                    warn!(?attempts, "Direct extraction exhausted, falling back to OCR");
                    self.recognize_pages(&source, cancel).await?
                }
                Err(err) => return Err(err),
            },
        };

        let corpus_text = recovered.corpus_text();

        // Render before publishing anything, so a render failure leaves no corpus.
        let pdf = match &request.pdf_path {
            Some(_) => Some(self.regenerate(&source, corpus_text.clone()).await?),
            None => None,
        };

        check_cancelled(cancel)?;

        // Stage every artifact before any of them becomes visible.
        let mut staged = Vec::with_capacity(2);
        staged.push(match &recovered {
            Recovered::Direct { .. } => output::stage_plain_text(&request.corpus_path, &corpus_text)?,
            Recovered::Ocr { corpus, .. } => output::stage_corpus(&request.corpus_path, corpus)?,
        });
        if let (Some(path), Some(pdf)) = (&request.pdf_path, &pdf) {
            staged.push(output::stage_pdf(path, pdf)?);
        }
        output::publish_together(staged)?;

        let (mode_used, extraction_strategy, pages) = match recovered {
            Recovered::Direct { extraction } => {
                (RecoveryMode::Direct, Some(extraction.strategy.to_string()), Vec::new())
            }
            Recovered::Ocr { outcomes, .. } => (RecoveryMode::Ocr, None, outcomes),
        };

        let report = RecoveryReport {
            run_id,
            source: request.source.clone(),
            source_sha256: source.fingerprint(),
            requested_mode: request.mode,
            mode_used,
            extraction_strategy,
            page_count: source.page_count(),
            pages,
            corpus_path: request.corpus_path.clone(),
            pdf_path: request.pdf_path.clone(),
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            %run_id,
            mode_used = %report.mode_used,
            degraded = report.degraded_pages().len(),
            "Recovery finished"
        );
        Ok(report)
    }

    /// Direct text-layer extraction through the strategy chain.
    pub async fn extract_direct(&self, source: &SourceDocument) -> Result<Extraction> {
        let chain = Arc::clone(&self.chain);
        let source = source.clone();
        blocking(move || chain.extract(&source)).await
    }

    /// Rasterize and recognize every page in order.
    async fn recognize_pages(&self, source: &SourceDocument, cancel: &CancelToken) -> Result<Recovered> {
        let stage = self
            .ocr
            .clone()
            .ok_or(QalatError::Unavailable("OCR"))?;

        let page_count = {
            let rasterizer = Arc::clone(&stage.rasterizer);
            let source = source.clone();
            blocking(move || rasterizer.page_count(&source)).await?
        };
        info!(
            page_count,
            engine = stage.recognizer.name(),
            lang = %self.config.ocr.language,
            "OCR started"
        );

        let mut corpus = Corpus::with_capacity(page_count as usize);
        let mut outcomes = Vec::with_capacity(page_count as usize);

        for page_index in 1..=page_count {
            check_cancelled(cancel)?;

            let (text, status) = self.recognize_page(&stage, source, page_index, cancel).await?;
            outcomes.push(PageOutcome {
                page_index,
                status,
                char_count: text.chars().count(),
            });
            corpus.push(RecognizedPage::new(page_index, text))?;
        }

        Ok(Recovered::Ocr { corpus, outcomes })
    }

    /// One page: rasterize (fatal on error), then recognize (non-fatal).
    #[instrument(skip(self, stage, source, cancel))]
    async fn recognize_page(
        &self,
        stage: &OcrStage,
        source: &SourceDocument,
        page_index: u32,
        cancel: &CancelToken,
    ) -> Result<(String, PageStatus)> {
        let image = {
            let rasterizer = Arc::clone(&stage.rasterizer);
            let source = source.clone();
            blocking(move || rasterizer.rasterize(&source, page_index)).await?
        };

        let recognizer = Arc::clone(&stage.recognizer);
        let language = self.config.ocr.language.clone();
        let binarize = self.config.ocr.binarize;
        let handle = tokio::task::spawn_blocking(move || {
            let image = if binarize {
                prepare_for_recognition(image)
            } else {
                image
            };
            recognizer.recognize(&image, &language)
        });

        let limit = self.page_timeout;
        let recognition = async move {
            match limit {
                Some(limit) => tokio::time::timeout(limit, handle).await.ok(),
                None => Some(handle.await),
            }
        };

        let finished = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(QalatError::Cancelled),
            finished = recognition => finished,
        };

        let result = match finished {
            None => {
                let after_ms = limit.map_or(0, |l| l.as_millis() as u64);
                warn!(after_ms, "Recognition timed out, recording empty page");
                return Ok((String::new(), PageStatus::TimedOut { after_ms }));
            }
            Some(joined) => joined.map_err(|err| QalatError::RecognitionFailed {
                page: page_index,
                reason: format!("recognition task failed: {}", err),
            }),
        };

        match result.and_then(|inner| inner) {
            Ok(text) => {
                debug!(chars = text.chars().count(), "Page recognized");
                Ok((text, PageStatus::Recognized))
            }
            Err(err) => {
                warn!(error = %err, "Recognition failed, recording empty page");
                Ok((
                    String::new(),
                    PageStatus::Failed {
                        reason: err.to_string(),
                    },
                ))
            }
        }
    }

    async fn regenerate(&self, source: &SourceDocument, text: String) -> Result<RegeneratedPdf> {
        let mut regenerator = PdfRegenerator::new(self.config.reflow.clone());
        if let Some(stem) = source.path().file_stem() {
            regenerator.set_title(stem.to_string_lossy());
        }
        blocking(move || regenerator.render(&text)).await
    }
}

fn check_cancelled(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        info!("Recovery cancelled, nothing published");
        return Err(QalatError::Cancelled);
    }
    Ok(())
}

/// Run synchronous document work on the blocking pool.
async fn blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| QalatError::Io(std::io::Error::other(err)))?
}
