use super::map_samples;
use crate::error::NoteError;
use image::DynamicImage;

/// Binarization forms. A sample equal to the cut value takes the "above" branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// above -> max, otherwise 0
    #[default]
    Binary,
    /// above -> 0, otherwise max
    BinaryInverse,
    /// above -> cut, otherwise unchanged
    Truncate,
    /// above -> unchanged, otherwise 0
    ToZero,
    /// above -> 0, otherwise unchanged
    ToZeroInverse,
}

/// Parameters shared by the fixed and the adaptive threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdParams {
    pub max_value: f64,
    pub mode: ThresholdMode,
}

impl ThresholdParams {
    pub fn new(max_value: f64, mode: ThresholdMode) -> Self {
        Self { max_value, mode }
    }

    pub(crate) fn max_sample(&self) -> Result<u8, NoteError> {
        if !self.max_value.is_finite() {
            return Err(NoteError::InvalidParameter(format!(
                "threshold max value must be finite, got {}",
                self.max_value
            )));
        }
        Ok(self.max_value.clamp(0.0, 255.0).round() as u8)
    }
}

/// Binarize every sample against a fixed cut value
pub fn apply(image: DynamicImage, cut: f64, params: ThresholdParams) -> Result<DynamicImage, NoteError> {
    if !cut.is_finite() {
        return Err(NoteError::InvalidParameter(format!(
            "threshold cut value must be finite, got {}",
            cut
        )));
    }
    let max = params.max_sample()?;
    map_samples(image, |v| classify(v, cut, max, params.mode))
}

/// Threshold a single sample
pub(crate) fn classify(value: u8, cut: f64, max: u8, mode: ThresholdMode) -> u8 {
    let above = f64::from(value) >= cut;
    match mode {
        ThresholdMode::Binary => {
            if above {
                max
            } else {
                0
            }
        }
        ThresholdMode::BinaryInverse => {
            if above {
                0
            } else {
                max
            }
        }
        ThresholdMode::Truncate => {
            if above {
                cut.clamp(0.0, 255.0) as u8
            } else {
                value
            }
        }
        ThresholdMode::ToZero => {
            if above {
                value
            } else {
                0
            }
        }
        ThresholdMode::ToZeroInverse => {
            if above {
                0
            } else {
                value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn row(values: &[u8]) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(values.len() as u32, 1, |x, _| {
            Luma([values[x as usize]])
        }))
    }

    fn samples(image: &DynamicImage) -> Vec<u8> {
        image.to_luma8().into_raw()
    }

    #[test]
    fn test_inverse_binary_boundary() {
        let params = ThresholdParams::new(255.0, ThresholdMode::BinaryInverse);
        let result = apply(row(&[229, 230, 231]), 230.0, params).unwrap();

        assert_eq!(samples(&result), vec![255, 0, 0]);
    }

    #[test]
    fn test_binary_boundary() {
        let params = ThresholdParams::new(255.0, ThresholdMode::Binary);
        let result = apply(row(&[124, 125, 126]), 125.0, params).unwrap();

        assert_eq!(samples(&result), vec![0, 255, 255]);
    }

    #[test]
    fn test_truncate_and_to_zero_modes() {
        let input = row(&[10, 100, 200]);

        let truncated = apply(input.clone(), 100.0, ThresholdParams::new(255.0, ThresholdMode::Truncate));
        assert_eq!(samples(&truncated.unwrap()), vec![10, 100, 100]);

        let to_zero = apply(input.clone(), 100.0, ThresholdParams::new(255.0, ThresholdMode::ToZero));
        assert_eq!(samples(&to_zero.unwrap()), vec![0, 100, 200]);

        let to_zero_inv = apply(input, 100.0, ThresholdParams::new(255.0, ThresholdMode::ToZeroInverse));
        assert_eq!(samples(&to_zero_inv.unwrap()), vec![10, 0, 0]);
    }

    #[test]
    fn test_max_value_is_clamped() {
        let params = ThresholdParams::new(1000.0, ThresholdMode::Binary);
        let result = apply(row(&[200]), 100.0, params).unwrap();
        assert_eq!(samples(&result), vec![255]);
    }

    #[test]
    fn test_threshold_keeps_channel_layout() {
        let img = RgbImage::from_pixel(3, 3, Rgb([50, 150, 250]));
        let params = ThresholdParams::new(255.0, ThresholdMode::Binary);
        let result = apply(DynamicImage::ImageRgb8(img), 128.0, params).unwrap();

        assert_eq!(result.color(), image::ColorType::Rgb8);
        assert_eq!(result.to_rgb8().get_pixel(0, 0).0, [0, 255, 255]);
    }

    #[test]
    fn test_threshold_rejects_nan_cut() {
        let params = ThresholdParams::new(255.0, ThresholdMode::Binary);
        assert!(apply(row(&[1]), f64::NAN, params).is_err());
    }
}
