// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pure-Rust recognizer built on `ocrs`, with neural network models executed
// via `rten`.
//
// # Feature Gate
//
// Only compiled with the `ocr` feature:
//
// ```toml
// qalat-document = { path = "crates/qalat-document", features = ["ocr"] }
// ```
//
// # Models
//
// Two model files are required, `text-detection.rten` and
// `text-recognition.rten`. Running `ocrs-cli` once downloads them into
// `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`), which is where
// [`OcrModelPaths::default`] looks.
//
// Script coverage is fixed by the loaded recognition model. The language
// identifier handed to `recognize` is logged and otherwise ignored; use the
// Tesseract recognizer when the language must be selected per run.

use std::path::{Path, PathBuf};

use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use qalat_core::error::{QalatError, Result};
use qalat_core::types::OcrLanguage;
use rten::Model;
use tracing::{debug, info, instrument};

use super::TextRecognizer;
use crate::raster::PageImage;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `$XDG_CACHE_HOME/ocrs`, then `~/.cache/ocrs`, then `./ocrs-models`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Where the detection and recognition models live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrModelPaths {
    pub detection: PathBuf,
    pub recognition: PathBuf,
}

impl Default for OcrModelPaths {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrModelPaths {
    /// Both models under one directory, with their well-known file names.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection: dir.join(DETECTION_MODEL_FILENAME),
            recognition: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    fn validate(&self) -> Result<()> {
        for (role, path) in [("detection", &self.detection), ("recognition", &self.recognition)] {
            if !path.exists() {
                return Err(QalatError::OcrEngine(format!(
                    "{role} model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

fn load_model(role: &str, path: &Path) -> Result<Model> {
    info!(role, path = %path.display(), "Loading OCR model");
    Model::load_file(path).map_err(|err| {
        QalatError::OcrEngine(format!(
            "failed to load {role} model from {}: {}",
            path.display(),
            err
        ))
    })
}

/// `ocrs` engine wrapped as a [`TextRecognizer`].
///
/// Model loading is the expensive step, so build one engine per run and reuse
/// it for every page. `ocrs` and `rten` should be compiled in release mode;
/// debug builds are one to two orders of magnitude slower.
pub struct OcrsEngine {
    engine: OcrEngine,
}

impl OcrsEngine {
    /// # Errors
    ///
    /// [`QalatError::OcrEngine`] if a model file is missing or corrupt.
    #[instrument(skip_all, fields(detection = %paths.detection.display()))]
    pub fn new(paths: &OcrModelPaths) -> Result<Self> {
        paths.validate()?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(load_model("detection", &paths.detection)?),
            recognition_model: Some(load_model("recognition", &paths.recognition)?),
            ..Default::default()
        })
        .map_err(|err| QalatError::OcrEngine(format!("failed to initialise OCR engine: {}", err)))?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }

    /// Load models from the default cache directory.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&OcrModelPaths::default())
    }
}

impl TextRecognizer for OcrsEngine {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip(self, image), fields(page = image.page_index(), lang = %language))]
    fn recognize(&self, image: &PageImage, language: &OcrLanguage) -> Result<String> {
        let page = image.page_index();
        let failed = |reason: String| QalatError::RecognitionFailed { page, reason };

        debug!("language hint not used by ocrs");

        let pixels = image.pixels();
        let source = ImageSource::from_bytes(pixels.as_raw(), pixels.dimensions())
            .map_err(|err| failed(format!("invalid image source: {}", err)))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| failed(format!("preprocessing failed: {}", err)))?;
        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| failed(format!("recognition failed: {}", err)))?;

        debug!(lines = text.lines().count(), "ocrs recognition complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_paths_use_well_known_names() {
        let paths = OcrModelPaths::from_dir("/tmp/qalat-models");
        assert_eq!(paths.detection, PathBuf::from("/tmp/qalat-models/text-detection.rten"));
        assert_eq!(
            paths.recognition,
            PathBuf::from("/tmp/qalat-models/text-recognition.rten")
        );
    }

    #[test]
    fn missing_models_fail_engine_setup() {
        let paths = OcrModelPaths::from_dir("/nonexistent/qalat/ocr-models");
        assert!(matches!(OcrsEngine::new(&paths), Err(QalatError::OcrEngine(_))));
    }
}
