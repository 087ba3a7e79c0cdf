// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract recognizer — drives the `tesseract` executable, which is the
// language-aware engine (trained data such as `amh` for Ge'ez script).

use std::path::{Path, PathBuf};
use std::process::Command;

use qalat_core::error::{QalatError, Result};
use qalat_core::types::OcrLanguage;
use tracing::{debug, instrument};

use super::TextRecognizer;
use crate::raster::PageImage;

const DEFAULT_BINARY: &str = "tesseract";

/// Runs `tesseract <page.png> stdout -l <lang>` for every page.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
}

impl TesseractRecognizer {
    /// Use the `tesseract` found on `PATH`.
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_BINARY)
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// The full invocation for one page image on disk.
    fn command(&self, image_path: &Path, language: &OcrLanguage) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg(image_path)
            .arg("stdout")
            .args(["-l", language.as_str()])
            // LSTM engine, fully automatic page segmentation.
            .args(["--oem", "3", "--psm", "3"]);
        command
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[instrument(skip(self, image), fields(page = image.page_index(), lang = %language))]
    fn recognize(&self, image: &PageImage, language: &OcrLanguage) -> Result<String> {
        let page = image.page_index();
        let failed = |reason: String| QalatError::RecognitionFailed { page, reason };

        // The scratch directory and its PNG are removed when `scratch` drops.
        let scratch = tempfile::tempdir().map_err(|err| failed(err.to_string()))?;
        let image_path = scratch.path().join(format!("page-{page}.png"));
        std::fs::write(&image_path, image.to_png_bytes()?)
            .map_err(|err| failed(format!("cannot stage page image: {}", err)))?;

        let output = self
            .command(&image_path, language)
            .output()
            .map_err(|err| failed(format!("cannot run {}: {}", self.binary.display(), err)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.chars().count(), "Tesseract recognition complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn command_passes_language_and_stdout() {
        let recognizer = TesseractRecognizer::new();
        let command = recognizer.command(Path::new("/tmp/page-3.png"), &OcrLanguage::new("amh+eng"));
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            ["/tmp/page-3.png", "stdout", "-l", "amh+eng", "--oem", "3", "--psm", "3"]
        );
        assert_eq!(command.get_program(), "tesseract");
    }

    #[test]
    fn missing_binary_is_a_recognition_failure() {
        let recognizer = TesseractRecognizer::with_binary("/nonexistent/qalat/tesseract");
        let image = PageImage::new(4, 2.0, RgbImage::new(4, 4));
        match recognizer.recognize(&image, &OcrLanguage::amharic()) {
            Err(QalatError::RecognitionFailed { page, .. }) => assert_eq!(page, 4),
            other => panic!("expected RecognitionFailed, got {other:?}"),
        }
    }
}
