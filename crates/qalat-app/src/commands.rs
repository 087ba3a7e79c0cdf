// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command handlers for the `qalat` binary.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use qalat_core::QalatConfig;
use qalat_core::error::Result;
use qalat_core::types::{OcrLanguage, RecoveryReport};
use qalat_document::output::write_report;
use qalat_document::{CancelToken, RecoveryRequest};
use qalat_reader::{Annotations, KeywordAnnotator, Paginator};
use tracing::{info, instrument, warn};

use crate::services::{build_pipeline, load_config};
use crate::{Cli, Command, RecoverArgs};

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Recover(args) => recover(config, args).await,
        Command::Paginate { corpus, page } => paginate(&config, &corpus, page),
        Command::Annotate { corpus, keywords } => annotate(&config, &corpus, keywords),
    }
}

#[instrument(skip_all, fields(input = %args.input.display()))]
async fn recover(mut config: QalatConfig, args: RecoverArgs) -> Result<()> {
    if let Some(lang) = args.lang {
        config.ocr.language = OcrLanguage::new(lang);
    }
    if args.page_timeout.is_some() {
        config.ocr.page_timeout_secs = args.page_timeout;
    }
    if args.binarize {
        config.ocr.binarize = true;
    }
    config.validate()?;

    let pipeline = build_pipeline(config, args.engine)?;
    let mut request = RecoveryRequest::new(&args.input, &args.corpus).with_mode(args.mode.into());
    if let Some(pdf) = &args.pdf {
        request = request.with_pdf(pdf);
    }

    let cancel = CancelToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling recovery");
                cancel.cancel();
            }
        })
    };
    let result = pipeline.run(&request, &cancel).await;
    interrupt.abort();
    let report = result?;

    if let Some(path) = &args.report {
        write_report(path, &report)?;
        info!(path = %path.display(), "Run report written");
    }

    print_summary(&report)?;
    Ok(())
}

fn print_summary(report: &RecoveryReport) -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(
        out,
        "Recovered {} ({} pages) via {} into {}",
        report.source.display(),
        report.page_count,
        report.mode_used,
        report.corpus_path.display()
    )?;
    if let Some(strategy) = &report.extraction_strategy {
        writeln!(out, "  extraction strategy: {strategy}")?;
    }
    let degraded = report.degraded_pages();
    if !degraded.is_empty() {
        writeln!(out, "  pages recorded empty: {degraded:?}")?;
    }
    if let Some(pdf) = &report.pdf_path {
        writeln!(out, "  re-flowed PDF: {}", pdf.display())?;
    }
    Ok(())
}

/// Reading view: each page with the bookmark and note the configured keywords
/// produce for it.
fn paginate(config: &QalatConfig, corpus: &Path, page: Option<u32>) -> Result<()> {
    let text = std::fs::read_to_string(corpus)?;
    let mut pager = Paginator::from_corpus_text(&text);
    let annotations = annotations_for(
        &pager,
        &KeywordAnnotator::from_settings(&config.annotation),
        &config.annotation.note_label,
    );
    let mut out = std::io::stdout().lock();

    if let Some(page) = page {
        pager.go_to(page)?;
        return print_page(&mut out, &pager, &annotations);
    }

    if pager.total_pages() == 0 {
        writeln!(out, "(empty corpus)")?;
        return Ok(());
    }
    loop {
        print_page(&mut out, &pager, &annotations)?;
        if !pager.next() {
            return Ok(());
        }
    }
}

fn print_page(out: &mut impl Write, pager: &Paginator, annotations: &Annotations) -> Result<()> {
    let page = pager.current_page();
    writeln!(
        out,
        "== Page {} of {} ({}%) ==",
        page,
        pager.total_pages(),
        pager.progress_percent()
    )?;
    if let Some(bookmark) = annotations.bookmark_for(page) {
        writeln!(out, "[bookmark] {}", bookmark.note)?;
    }
    if let Some(note) = annotations.note_for(page) {
        writeln!(out, "[note] {}", note.text)?;
    }
    writeln!(out, "{}\n", pager.current_text().unwrap_or_default())?;
    Ok(())
}

fn annotations_for(pager: &Paginator, annotator: &KeywordAnnotator, note_label: &str) -> Annotations {
    let candidates = annotator.annotate(pager.pages());
    Annotations::from_candidates(&candidates, note_label)
}

fn annotate(config: &QalatConfig, corpus: &Path, keywords: Vec<String>) -> Result<()> {
    let settings = &config.annotation;
    let annotator = if keywords.is_empty() {
        KeywordAnnotator::from_settings(settings)
    } else {
        KeywordAnnotator::new(keywords, settings.before, settings.after)
    };

    let text = std::fs::read_to_string(corpus)?;
    let pager = Paginator::from_corpus_text(&text);
    let annotations = annotations_for(&pager, &annotator, &settings.note_label);
    if annotations.is_empty() {
        info!(keywords = ?annotator.keywords(), "No keyword found on any page");
    }

    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &annotations)?;
    writeln!(out)?;
    Ok(())
}
