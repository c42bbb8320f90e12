//! OCR engine implementations
//!
//! Engines are conditionally compiled based on feature flags and only the one
//! named in the configuration is initialized.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::NoteError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Engine name that turns recognition off
pub const NO_ENGINE: &str = "none";

/// Registry of initialized OCR engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn OcrEngine>>,
}

impl EngineRegistry {
    /// Initialize the engine selected by `config.engine`
    pub fn new(config: &Config) -> Result<Self, NoteError> {
        let mut engines: Vec<Arc<dyn OcrEngine>> = Vec::new();

        match config.engine.as_str() {
            NO_ENGINE => tracing::info!("OCR disabled"),
            #[cfg(feature = "engine-ocrs")]
            "ocrs" => {
                tracing::info!("Initializing ocrs engine...");
                engines.push(Arc::new(ocrs::OcrsEngine::new(config)?));
            }
            #[cfg(feature = "engine-leptess")]
            "leptess" => {
                tracing::info!("Initializing leptess engine...");
                engines.push(Arc::new(leptess::LeptessEngine::new(config)?));
            }
            other => {
                return Err(NoteError::InitializationError(format!(
                    "Unknown or disabled OCR engine '{}'. Available: {}",
                    other,
                    available().join(", ")
                )))
            }
        }

        Ok(Self { engines })
    }

    /// The first initialized engine, if any
    pub fn default(&self) -> Option<Arc<dyn OcrEngine>> {
        self.engines.first().cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }
}

/// Engine names compiled into this binary
pub fn available() -> Vec<&'static str> {
    let mut names = vec![NO_ENGINE];
    #[cfg(feature = "engine-ocrs")]
    names.push("ocrs");
    #[cfg(feature = "engine-leptess")]
    names.push("leptess");
    names
}

/// Directory downloaded models and training data are cached in
#[cfg_attr(not(any(feature = "engine-ocrs", feature = "engine-leptess")), allow(dead_code))]
pub(crate) fn cache_dir() -> Result<PathBuf, NoteError> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("note-splitter");

    std::fs::create_dir_all(&dir).map_err(|e| {
        NoteError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;
    Ok(dir)
}

/// Return `dir/filename`, downloading it from `url` first if it is missing
#[cfg_attr(not(any(feature = "engine-ocrs", feature = "engine-leptess")), allow(dead_code))]
pub(crate) fn ensure_downloaded(url: &str, dir: &Path, filename: &str) -> Result<PathBuf, NoteError> {
    let path = dir.join(filename);

    if path.exists() {
        tracing::info!("Using cached {:?}", path);
    } else {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        download_file(url, &path)?;
        tracing::info!("Downloaded {} to {:?}", filename, path);
    }

    Ok(path)
}

fn download_file(url: &str, path: &Path) -> Result<(), NoteError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| NoteError::InitializationError(format!("Failed to download {}: {}", url, e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        NoteError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    // Partial downloads must not be mistaken for a cached file
    let partial = path.with_extension("part");
    std::fs::write(&partial, &buffer)?;
    std::fs::rename(&partial, path)?;
    Ok(())
}
