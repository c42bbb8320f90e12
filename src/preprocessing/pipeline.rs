use crate::error::NoteError;
use image::DynamicImage;
use serde::Serialize;
use std::time::Instant;

use super::operation::Operation;
use super::sequence::{Sequence, SequenceBuilder};
use super::steps::{
    adaptive::AdaptiveMethod, blur::BorderMode, color::ColorConversion, threshold::ThresholdMode,
};

/// Cut value used to binarize pages before contour extraction
pub const DEFAULT_THRESHOLD: f64 = 125.0;
/// Saturated 8-bit sample value
pub const MAX_VALUE: f64 = 255.0;

/// Named preprocessing sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// No operations
    None,
    /// Steps: grayscale, binary threshold at 125
    Notes,
    /// Steps: 4x4 blur, grayscale, inverse threshold at 230
    #[default]
    Outline,
    /// Steps: grayscale, 5x5 blur, adaptive mean threshold
    Adaptive,
    /// OCR preparation. Steps: grayscale, adaptive Gaussian threshold
    Prepare,
}

impl Preset {
    /// Parse from a command line value
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "notes" => Some(Self::Notes),
            "outline" => Some(Self::Outline),
            "adaptive" => Some(Self::Adaptive),
            "prepare" => Some(Self::Prepare),
            _ => None,
        }
    }

    /// Get the preset name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Notes => "notes",
            Self::Outline => "outline",
            Self::Adaptive => "adaptive",
            Self::Prepare => "prepare",
        }
    }

    /// Build the operations of this preset
    pub fn sequence(&self) -> Sequence {
        let mut builder = SequenceBuilder::new();
        match self {
            Self::None => {}
            Self::Notes => {
                builder
                    .color_convert(ColorConversion::ToGray)
                    .simple_threshold(DEFAULT_THRESHOLD, MAX_VALUE, ThresholdMode::Binary);
            }
            Self::Outline => {
                builder
                    .blur((4, 4), (-1, -1), BorderMode::Reflect101)
                    .color_convert(ColorConversion::ToGray)
                    .simple_threshold(230.0, MAX_VALUE, ThresholdMode::BinaryInverse);
            }
            Self::Adaptive => {
                builder
                    .color_convert(ColorConversion::ToGray)
                    .blur((5, 5), (-1, -1), BorderMode::Reflect101)
                    .adaptive_threshold(
                        MAX_VALUE,
                        ThresholdMode::Binary,
                        AdaptiveMethod::Mean,
                        7,
                        1.0,
                    );
            }
            Self::Prepare => {
                builder
                    .color_convert(ColorConversion::ToGray)
                    .adaptive_threshold(
                        MAX_VALUE,
                        ThresholdMode::Binary,
                        AdaptiveMethod::Gaussian,
                        31,
                        10.0,
                    );
            }
        }
        builder.build()
    }
}

/// Timing information for a single operation
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of executing a sequence including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// Final image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    /// Total execution time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings, in execution order
    pub steps: Vec<StepTiming>,
}

/// Folds a sequence over an image, one operation at a time
#[derive(Debug, Default)]
pub struct Executor {
    timings: Vec<StepTiming>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every operation in insertion order, stopping at the first failure
    pub fn run(mut self, image: DynamicImage, sequence: &Sequence) -> Result<ExecutionReport, NoteError> {
        let start = Instant::now();
        let mut img = image;
        tracing::debug!("Running {} operation(s): {:?}", sequence.len(), sequence.names());
        self.timings.reserve(sequence.len());

        for operation in sequence {
            img = self.run_step(operation, img)?;
        }

        Ok(ExecutionReport {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: self.timings,
        })
    }

    fn run_step(&mut self, operation: &Operation, img: DynamicImage) -> Result<DynamicImage, NoteError> {
        let step_start = Instant::now();
        let result = operation.apply(img)?;
        let time_ms = step_start.elapsed().as_millis() as u64;

        tracing::debug!(
            "{} -> {}x{} ({} channel(s)) in {}ms",
            operation.name(),
            result.width(),
            result.height(),
            result.color().channel_count(),
            time_ms
        );

        self.timings.push(StepTiming {
            name: operation.name().to_string(),
            time_ms,
        });
        Ok(result)
    }
}

/// Execute a sequence and return the final image
pub fn execute(image: DynamicImage, sequence: &Sequence) -> Result<DynamicImage, NoteError> {
    Ok(Executor::new().run(image, sequence)?.image)
}

/// Execute a sequence and keep the per-step timings
pub fn execute_timed(image: DynamicImage, sequence: &Sequence) -> Result<ExecutionReport, NoteError> {
    Executor::new().run(image, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn page() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(32, 24, |x, y| {
            Rgb([(x * 7) as u8, (y * 9) as u8, ((x + y) * 3) as u8])
        }))
    }

    #[test]
    fn test_empty_sequence_is_identity() {
        let img = page();
        let result = execute(img.clone(), &Preset::None.sequence()).unwrap();

        assert_eq!(result, img);
    }

    #[test]
    fn test_execution_follows_insertion_order() {
        // Inverse threshold before grayscale keeps three channels;
        // grayscale first collapses to one
        let mut builder = SequenceBuilder::new();
        let threshold_first = builder
            .simple_threshold(100.0, MAX_VALUE, ThresholdMode::BinaryInverse)
            .color_convert(ColorConversion::ToRgb)
            .build();
        let gray_first = builder
            .color_convert(ColorConversion::ToGray)
            .simple_threshold(100.0, MAX_VALUE, ThresholdMode::BinaryInverse)
            .build();

        let a = execute(page(), &threshold_first).unwrap();
        let b = execute(page(), &gray_first).unwrap();

        assert_eq!(a.color().channel_count(), 3);
        assert_eq!(b.color().channel_count(), 1);
    }

    #[test]
    fn test_execution_stops_at_first_failure() {
        let sequence = SequenceBuilder::new()
            .adaptive_threshold(MAX_VALUE, ThresholdMode::Binary, AdaptiveMethod::Mean, 3, 0.0)
            .color_convert(ColorConversion::ToGray)
            .build();

        let err = execute(page(), &sequence).unwrap_err();
        assert!(matches!(err, NoteError::UnsupportedChannelCount { .. }));
    }

    #[test]
    fn test_timed_execution_reports_every_step() {
        let report = execute_timed(page(), &Preset::Outline.sequence()).unwrap();

        let names: Vec<_> = report.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["blur", "color_convert", "threshold"]);
        assert_eq!(report.image.color().channel_count(), 1);
    }

    #[test]
    fn test_masked_sequence_zeroes_excluded_pixels() {
        let mask = GrayImage::from_fn(32, 24, |x, _| Luma([if x >= 16 { 255 } else { 0 }]));
        let sequence = SequenceBuilder::new().mask(mask).build();

        let result = execute(page(), &sequence).unwrap().to_rgb8();
        assert_eq!(result.get_pixel(3, 3).0, [0, 0, 0]);
        assert_eq!(result.get_pixel(20, 3).0, page().to_rgb8().get_pixel(20, 3).0);
    }

    #[test]
    fn test_sequence_shared_across_threads() {
        let sequence = Preset::Adaptive.sequence();
        let expected = execute(page(), &sequence).unwrap();
        let shared = &sequence;

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(move || execute(page(), shared).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_preset_round_trips_names() {
        for preset in [
            Preset::None,
            Preset::Notes,
            Preset::Outline,
            Preset::Adaptive,
            Preset::Prepare,
        ] {
            assert_eq!(Preset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(Preset::from_str("OUTLINE"), Some(Preset::Outline));
        assert_eq!(Preset::from_str("sharpen"), None);
        assert!(Preset::None.sequence().is_empty());
    }
}
