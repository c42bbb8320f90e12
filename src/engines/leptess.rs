//! Tesseract engine
//!
//! Statically linked through `tesseract-static`. Training data comes from
//! `--tessdata-path` when given, otherwise it is downloaded into the cache.

use super::{cache_dir, ensure_downloaded};
use crate::config::Config;
use crate::engine::{OcrEngine, OcrResult};
use crate::error::NoteError;
use image::DynamicImage;
use std::io::Cursor;
use std::path::PathBuf;
use tesseract_static::tesseract::Tesseract;

pub struct LeptessEngine {
    tessdata: String,
    language: String,
}

impl LeptessEngine {
    pub fn new(config: &Config) -> Result<Self, NoteError> {
        let language = config.language.clone();
        let dir = match &config.tessdata_path {
            Some(path) => PathBuf::from(path),
            None => {
                let dir = cache_dir()?.join("tessdata");
                std::fs::create_dir_all(&dir)?;
                let file = format!("{}.traineddata", language);
                ensure_downloaded(&tessdata_url(&language), &dir, &file)?;
                dir
            }
        };
        let tessdata = dir
            .to_str()
            .map(str::to_string)
            .ok_or_else(|| NoteError::InitializationError(format!("Invalid tessdata path {:?}", dir)))?;

        // Fail at startup rather than on the first note
        Tesseract::new(Some(&tessdata), Some(&language))
            .map_err(|e| NoteError::InitializationError(format!("Failed to initialize Tesseract: {}", e)))?;

        tracing::info!("leptess engine initialized (tessdata: {}, language: {})", tessdata, language);
        Ok(Self { tessdata, language })
    }
}

impl OcrEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine, tolerant of noisy phone photos"
    }

    fn process_image(&self, image: &DynamicImage) -> Result<OcrResult, NoteError> {
        // Leptonica always reads BMP
        let mut bmp = Vec::new();
        image
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut bmp), image::ImageFormat::Bmp)
            .map_err(|e| NoteError::ProcessingError(format!("Failed to convert to BMP: {}", e)))?;

        let mut tess = Tesseract::new(Some(&self.tessdata), Some(&self.language))
            .map_err(|e| NoteError::ProcessingError(format!("Failed to create Tesseract: {}", e)))?
            .set_image_from_mem(&bmp)
            .map_err(|e| NoteError::ProcessingError(format!("Failed to set image: {}", e)))?
            .recognize()
            .map_err(|e| NoteError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| NoteError::ProcessingError(format!("Failed to get text: {}", e)))?;
        let confidence = tess.mean_text_conf() as f32 / 100.0;

        tracing::debug!("leptess confidence {:.2}", confidence);
        Ok(OcrResult {
            text: text.trim().to_string(),
            confidence,
            warnings: Vec::new(),
        })
    }

    fn supported_languages(&self) -> Vec<String> {
        vec![self.language.clone()]
    }
}

/// tessdata_fast model for a language
fn tessdata_url(language: &str) -> String {
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tessdata_url() {
        assert!(tessdata_url("deu").ends_with("/deu.traineddata"));
    }
}
