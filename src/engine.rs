use crate::error::NoteError;
use image::DynamicImage;
use serde::Serialize;
use std::path::Path;

/// Text recognized in one note
#[derive(Debug, Clone, Serialize)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
    pub warnings: Vec<String>,
}

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Recognize text in an image file
    fn process(&self, path: &Path) -> Result<OcrResult, NoteError> {
        let image = crate::io::load_image(path)?;
        self.process_image(&image)
    }

    /// Recognize text in a decoded image
    fn process_image(&self, image: &DynamicImage) -> Result<OcrResult, NoteError>;

    fn supported_languages(&self) -> Vec<String>;
}
