use super::steps::{
    self,
    adaptive::{AdaptiveMethod, AdaptiveParams},
    blur::BorderMode,
    color::ColorConversion,
    threshold::{ThresholdMode, ThresholdParams},
};
use crate::error::NoteError;
use image::{DynamicImage, GrayImage};

/// One step of a preprocessing sequence
#[derive(Debug, Clone)]
pub enum Operation {
    ColorConvert {
        conversion: ColorConversion,
    },
    Blur {
        window: (u32, u32),
        anchor: (i32, i32),
        border: BorderMode,
    },
    Threshold {
        cut: f64,
        params: ThresholdParams,
    },
    AdaptiveThreshold(AdaptiveParams),
    Mask {
        mask: GrayImage,
    },
}

impl Operation {
    /// Short name used in logs and step timings
    pub fn name(&self) -> &'static str {
        match self {
            Self::ColorConvert { .. } => "color_convert",
            Self::Blur { .. } => "blur",
            Self::Threshold { .. } => "threshold",
            Self::AdaptiveThreshold(_) => "adaptive_threshold",
            Self::Mask { .. } => "mask",
        }
    }

    /// Run this operation, producing a new image
    pub fn apply(&self, image: DynamicImage) -> Result<DynamicImage, NoteError> {
        match self {
            Self::ColorConvert { conversion } => steps::color::apply(image, *conversion),
            Self::Blur {
                window,
                anchor,
                border,
            } => steps::blur::apply(image, *window, *anchor, *border),
            Self::Threshold { cut, params } => steps::threshold::apply(image, *cut, *params),
            Self::AdaptiveThreshold(params) => steps::adaptive::apply(image, params),
            Self::Mask { mask } => steps::mask::apply(image, mask),
        }
    }

    pub fn adaptive_threshold(
        max_value: f64,
        mode: ThresholdMode,
        method: AdaptiveMethod,
        block_size: u32,
        constant: f64,
    ) -> Self {
        Self::AdaptiveThreshold(AdaptiveParams {
            threshold: ThresholdParams::new(max_value, mode),
            method,
            block_size,
            constant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn test_mask_dispatch_applies_mask() {
        // Regression: masking through the dispatcher used to be a no-op
        let img = GrayImage::from_pixel(4, 4, Luma([180]));
        let mask = GrayImage::from_fn(4, 4, |_, y| Luma([if y < 2 { 255 } else { 0 }]));

        let result = Operation::Mask { mask }
            .apply(DynamicImage::ImageLuma8(img))
            .unwrap()
            .to_luma8();

        assert_eq!(result.get_pixel(0, 0).0[0], 180);
        assert_eq!(result.get_pixel(3, 1).0[0], 180);
        assert_eq!(result.get_pixel(0, 2).0[0], 0);
        assert_eq!(result.get_pixel(3, 3).0[0], 0);
    }

    #[test]
    fn test_dispatch_reaches_each_transform() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 200, 200])));

        let gray = Operation::ColorConvert {
            conversion: ColorConversion::ToGray,
        }
        .apply(img)
        .unwrap();
        assert_eq!(gray.color().channel_count(), 1);

        let blurred = Operation::Blur {
            window: (3, 3),
            anchor: (-1, -1),
            border: BorderMode::Reflect101,
        }
        .apply(gray)
        .unwrap();

        let binary = Operation::Threshold {
            cut: 100.0,
            params: ThresholdParams::new(255.0, ThresholdMode::Binary),
        }
        .apply(blurred.clone())
        .unwrap();
        assert!(binary.to_luma8().pixels().all(|p| p.0[0] == 255));

        let adaptive = Operation::adaptive_threshold(
            255.0,
            ThresholdMode::Binary,
            AdaptiveMethod::Mean,
            3,
            1.0,
        )
        .apply(blurred)
        .unwrap();
        assert!(adaptive.to_luma8().pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_adaptive_dispatch_checks_channels() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
        let op = Operation::adaptive_threshold(
            255.0,
            ThresholdMode::Binary,
            AdaptiveMethod::Gaussian,
            5,
            0.0,
        );

        assert!(matches!(
            op.apply(img),
            Err(NoteError::UnsupportedChannelCount { .. })
        ));
    }
}
