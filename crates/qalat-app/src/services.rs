// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service wiring — configuration lookup and construction of the recovery
// pipeline for the engines compiled into this build.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use qalat_core::QalatConfig;
use qalat_core::error::{QalatError, Result};
use qalat_document::{RecoveryPipeline, TextRecognizer};
use tracing::info;

use crate::EngineArg;

/// `$XDG_CONFIG_HOME/qalat/config.json`, falling back to `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else {
        PathBuf::from(std::env::var("HOME").ok()?).join(".config")
    };
    Some(base.join("qalat").join("config.json"))
}

/// Load an explicit config file, or the default one when it exists, or the
/// built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<QalatConfig> {
    if let Some(path) = explicit {
        return QalatConfig::load(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "Using default config file");
            QalatConfig::load(&path)
        }
        _ => Ok(QalatConfig::default()),
    }
}

/// Pipeline for `config`, with an OCR stage when page rendering is compiled in.
///
/// A missing OCR stage is not an error here: direct recovery still works, and
/// the pipeline reports the OCR route as unavailable if it is needed.
pub fn build_pipeline(config: QalatConfig, engine: EngineArg) -> Result<RecoveryPipeline> {
    let pipeline = RecoveryPipeline::new(config);

    #[cfg(feature = "render")]
    {
        let rasterizer = qalat_document::MupdfRasterizer::new(pipeline.config().raster);
        let recognizer = recognizer(engine)?;
        info!(engine = recognizer.name(), "OCR stage ready");
        Ok(pipeline.with_ocr(Arc::new(rasterizer), recognizer))
    }

    #[cfg(not(feature = "render"))]
    {
        // Fail early on an engine that cannot exist in this build.
        let _ = recognizer(engine)?;
        tracing::warn!("built without page rendering; only direct text-layer recovery is available");
        Ok(pipeline)
    }
}

fn recognizer(engine: EngineArg) -> Result<Arc<dyn TextRecognizer>> {
    match engine {
        EngineArg::Tesseract => Ok(Arc::new(qalat_document::TesseractRecognizer::new())),
        #[cfg(feature = "ocr")]
        EngineArg::Ocrs => Ok(Arc::new(qalat_document::OcrsEngine::with_defaults()?)),
        #[cfg(not(feature = "ocr"))]
        EngineArg::Ocrs => Err(QalatError::Unavailable("ocrs")),
    }
}
