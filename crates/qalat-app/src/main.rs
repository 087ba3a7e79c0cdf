// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Qalat — recover scanned and text-layer PDFs into a paginated, annotated
// reading corpus.
//
// Entry point. Initialises logging, parses the command line, and dispatches to
// the command handlers.

mod commands;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use qalat_core::types::RecoveryMode;

#[derive(Debug, Parser)]
#[command(name = "qalat")]
#[command(version)]
#[command(about = "Recover PDF books into a paginated, annotated text corpus", long_about = None)]
struct Cli {
    /// JSON configuration file (default: $XDG_CONFIG_HOME/qalat/config.json if present)
    #[arg(long, global = true, value_name = "FILE", env = "QALAT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recover the text of a PDF into a corpus file
    Recover(RecoverArgs),

    /// Print corpus pages
    Paginate {
        /// Corpus text file
        #[arg(value_name = "CORPUS")]
        corpus: PathBuf,

        /// Print only this 1-based page
        #[arg(long)]
        page: Option<u32>,
    },

    /// Derive bookmarks and notes from keyword occurrences (JSON on stdout)
    Annotate {
        /// Corpus text file
        #[arg(value_name = "CORPUS")]
        corpus: PathBuf,

        /// Keyword to search for, in priority order (repeatable; replaces the configured set)
        #[arg(long = "keyword", value_name = "K")]
        keywords: Vec<String>,
    },
}

#[derive(Debug, clap::Args)]
struct RecoverArgs {
    /// Source PDF
    #[arg(value_name = "PDF")]
    input: PathBuf,

    /// Corpus output path
    #[arg(long, value_name = "FILE")]
    corpus: PathBuf,

    /// Also write a re-flowed PDF here
    #[arg(long, value_name = "FILE")]
    pdf: Option<PathBuf>,

    /// Recovery route
    #[arg(long, value_enum, default_value = "auto")]
    mode: ModeArg,

    /// OCR language identifier (e.g. amh, eng, amh+eng)
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,

    /// OCR engine
    #[arg(long, value_enum, default_value = "tesseract")]
    engine: EngineArg,

    /// Per-page recognition timeout in seconds
    #[arg(long, value_name = "SECS")]
    page_timeout: Option<u64>,

    /// Binarize pages before recognition
    #[arg(long)]
    binarize: bool,

    /// Write the run report (JSON) here
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Direct,
    Ocr,
    Auto,
}

impl From<ModeArg> for RecoveryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direct => RecoveryMode::Direct,
            ModeArg::Ocr => RecoveryMode::Ocr,
            ModeArg::Auto => RecoveryMode::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineArg {
    /// External `tesseract` executable
    Tesseract,
    /// Built-in ocrs engine (requires the `ocr` feature)
    Ocrs,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match commands::dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "qalat failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
