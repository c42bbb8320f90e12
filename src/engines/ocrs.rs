//! ocrs engine
//!
//! Pure Rust recognizer. The detection and recognition models are fetched
//! into the cache directory on first use.

use super::{cache_dir, ensure_downloaded};
use crate::config::Config;
use crate::engine::{OcrEngine, OcrResult};
use crate::error::NoteError;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;

const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    pub fn new(_config: &Config) -> Result<Self, NoteError> {
        let dir = cache_dir()?;
        let detection = load_model(DETECTION_MODEL_URL, &dir, "text-detection.rten")?;
        let recognition = load_model(RECOGNITION_MODEL_URL, &dir, "text-recognition.rten")?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection),
            recognition_model: Some(recognition),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| NoteError::InitializationError(format!("Failed to create OCR engine: {}", e)))?;

        tracing::info!("ocrs engine initialized");
        Ok(Self { engine })
    }
}

fn load_model(url: &str, dir: &std::path::Path, filename: &str) -> Result<Model, NoteError> {
    let path = ensure_downloaded(url, dir, filename)?;
    Model::load_file(&path)
        .map_err(|e| NoteError::InitializationError(format!("Failed to load {}: {}", filename, e)))
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine, no system dependencies"
    }

    fn process_image(&self, image: &DynamicImage) -> Result<OcrResult, NoteError> {
        let rgb = image.to_rgb8();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(|e| NoteError::ProcessingError(format!("Failed to create image source: {}", e)))?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| NoteError::ProcessingError(format!("Failed to prepare input: {}", e)))?;
        let words = self
            .engine
            .detect_words(&input)
            .map_err(|e| NoteError::ProcessingError(format!("Failed to detect words: {}", e)))?;
        let lines = self.engine.find_text_lines(&input, &words);
        let recognized = self
            .engine
            .recognize_text(&input, &lines)
            .map_err(|e| NoteError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let text = recognized
            .iter()
            .flatten()
            .map(|line| line.words().map(|w| w.to_string()).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n");

        tracing::debug!("ocrs recognized {} line(s)", lines.len());

        let mut warnings = Vec::new();
        if text.trim().is_empty() {
            warnings.push("No text recognized".to_string());
        }

        Ok(OcrResult {
            confidence: text_confidence(&text),
            text,
            warnings,
        })
    }

    fn supported_languages(&self) -> Vec<String> {
        // Latin alphabet only
        vec!["eng".to_string()]
    }
}

/// Plausibility score in [0, 1] for recognized text.
///
/// ocrs reports no per-character confidence, so the score is derived from
/// the text itself: the share of letters and digits among non-space
/// characters, dampened by single-character words and long runs of one
/// repeated character. Handwritten notes are short, so anything under four
/// characters scores 0.5.
fn text_confidence(text: &str) -> f32 {
    let visible: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if visible.is_empty() {
        return 0.0;
    }
    if visible.len() < 4 {
        return 0.5;
    }

    let alphanumeric = visible.iter().filter(|c| c.is_alphanumeric()).count() as f32;
    let clean = alphanumeric / visible.len() as f32;

    let words: Vec<&str> = text.split_whitespace().collect();
    let singles = words.iter().filter(|w| w.chars().count() == 1).count() as f32;
    let fragmented = 1.0 - 0.5 * singles / words.len() as f32;

    let repeated = if longest_run(text) > 4 { 0.6 } else { 1.0 };

    (clean * fragmented * repeated).clamp(0.0, 1.0)
}

/// Length of the longest run of one repeated non-space character
fn longest_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut prev = None;

    for c in text.chars() {
        if Some(c) == prev && !c.is_whitespace() {
            current += 1;
        } else {
            current = 1;
        }
        longest = longest.max(current);
        prev = Some(c);
    }
    longest
}
