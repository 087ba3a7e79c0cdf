// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact output — corpus text, regenerated PDF, and run report.
//
// Every artifact is first staged: its bytes are written to a temporary file in
// the destination directory and flushed. Staged artifacts are then renamed over
// their targets together. A failed write never leaves a partial file at a
// target path, and a run whose artifacts cannot all be staged publishes none.

use std::io::Write;
use std::path::{Path, PathBuf};

use qalat_core::corpus::Corpus;
use qalat_core::error::{QalatError, Result};
use qalat_core::types::RecoveryReport;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::pdf::writer::RegeneratedPdf;

fn write_failed(path: &Path, reason: String) -> QalatError {
    QalatError::CorpusWriteFailed {
        path: path.to_path_buf(),
        reason,
    }
}

/// Bytes written and flushed next to their target, not yet visible there.
///
/// Dropping a staged artifact removes its temporary file.
#[derive(Debug)]
pub struct StagedArtifact {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagedArtifact {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the staged file over its target.
    pub fn persist(self) -> Result<PathBuf> {
        let Self { file, target } = self;
        file.persist(&target)
            .map_err(|err| write_failed(&target, err.error.to_string()))?;
        debug!(path = %target.display(), "Artifact published");
        Ok(target)
    }
}

/// Write `bytes` to a temporary file in `path`'s directory.
#[instrument(skip(bytes), fields(path = %path.display(), bytes = bytes.len()))]
pub fn stage(path: &Path, bytes: &[u8]) -> Result<StagedArtifact> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".qalat-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|err| {
            write_failed(
                path,
                format!("cannot create temporary file in {}: {}", dir.display(), err),
            )
        })?;

    file.write_all(bytes)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| write_failed(path, err.to_string()))?;

    Ok(StagedArtifact {
        file,
        target: path.to_path_buf(),
    })
}

/// Publish staged artifacts in order.
///
/// If one rename fails, the targets already published by this call are
/// removed again and the remaining staged files are discarded.
pub fn publish_together(staged: Vec<StagedArtifact>) -> Result<()> {
    let mut published: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for artifact in staged {
        match artifact.persist() {
            Ok(target) => published.push(target),
            Err(err) => {
                for target in &published {
                    if let Err(remove_err) = std::fs::remove_file(target) {
                        warn!(
                            path = %target.display(),
                            error = %remove_err,
                            "Could not withdraw published artifact"
                        );
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Write `bytes` to `path` through a same-directory temporary file.
pub fn publish_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    stage(path, bytes)?.persist().map(|_| ())
}

/// Stage `corpus` in the page-marker format.
pub fn stage_corpus(path: &Path, corpus: &Corpus) -> Result<StagedArtifact> {
    info!(pages = corpus.len(), path = %path.display(), "Staging corpus");
    stage(path, corpus.to_text().as_bytes())
}

/// Stage text verbatim. Used for direct-path corpora, which carry no markers.
pub fn stage_plain_text(path: &Path, text: &str) -> Result<StagedArtifact> {
    info!(chars = text.chars().count(), path = %path.display(), "Staging plain-text corpus");
    stage(path, text.as_bytes())
}

/// Stage an already rendered PDF.
pub fn stage_pdf(path: &Path, pdf: &RegeneratedPdf) -> Result<StagedArtifact> {
    info!(pages = pdf.page_count, path = %path.display(), "Staging regenerated PDF");
    stage(path, &pdf.bytes)
}

/// Publish the run report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &RecoveryReport) -> Result<()> {
    let json = serde_json::to_vec_pretty(report)?;
    publish_atomically(path, &json)
}

#[cfg(test)]
mod tests {
    use qalat_core::config::ReflowSettings;
    use qalat_core::types::RecognizedPage;

    use super::*;
    use crate::pdf::writer::PdfRegenerator;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn publish_leaves_only_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book.txt");
        publish_atomically(&target, b"first").unwrap();
        publish_atomically(&target, b"second").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"second");
        assert_eq!(entries(dir.path()), vec!["book.txt"]);
    }

    #[test]
    fn failed_publish_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("book.txt");
        let err = publish_atomically(&target, b"text").unwrap_err();

        assert!(matches!(err, QalatError::CorpusWriteFailed { ref path, .. } if *path == target));
        assert!(!target.exists());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn corpus_file_uses_marker_format() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book.txt");
        let corpus = Corpus::from_pages([
            RecognizedPage::new(1, "ሰላም"),
            RecognizedPage::empty(2),
        ])
        .unwrap();

        stage_corpus(&target, &corpus).unwrap().persist().unwrap();
        let text = std::fs::read_to_string(&target).unwrap();
        assert_eq!(text, "\n\n-- Page 1 --\n\nሰላም\n\n-- Page 2 --\n\n");
        assert_eq!(Corpus::parse(&text), corpus);
    }

    #[test]
    fn regenerated_pdf_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book.pdf");
        let regenerator = PdfRegenerator::new(ReflowSettings::default());

        let pdf = regenerator.render("one\ntwo").unwrap();
        stage_pdf(&target, &pdf).unwrap().persist().unwrap();
        assert!(std::fs::read(&target).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn staged_artifact_is_invisible_until_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book.txt");
        let staged = stage(&target, b"text").unwrap();

        assert!(!target.exists());
        assert_eq!(staged.target(), target.as_path());
        drop(staged);
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn publish_together_withdraws_earlier_targets_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("book.txt");
        let sub = dir.path().join("out");
        std::fs::create_dir(&sub).unwrap();
        let pdf = sub.join("book.pdf");

        let first = stage(&corpus, b"corpus").unwrap();
        let second = stage(&pdf, b"%PDF").unwrap();
        // Removing the directory makes the second rename fail.
        std::fs::remove_dir_all(&sub).unwrap();

        let err = publish_together(vec![first, second]).unwrap_err();
        assert!(matches!(err, QalatError::CorpusWriteFailed { ref path, .. } if *path == pdf));
        assert!(!corpus.exists());
        assert!(entries(dir.path()).is_empty());
    }
}
