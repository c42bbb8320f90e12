use super::{from_samples, to_8bit};
use crate::error::NoteError;
use image::DynamicImage;

/// Channel layout conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorConversion {
    /// Collapse to a single luma channel
    ToGray,
    /// Three channel RGB, alpha dropped
    ToRgb,
    /// Four channel RGBA, opaque alpha added when missing
    ToRgba,
    /// Swap the first and third channel (RGB <-> BGR)
    SwapRedBlue,
}

/// Convert the channel layout of an image
pub fn apply(image: DynamicImage, conversion: ColorConversion) -> Result<DynamicImage, NoteError> {
    match conversion {
        ColorConversion::ToGray => Ok(DynamicImage::ImageLuma8(image.to_luma8())),
        ColorConversion::ToRgb => Ok(DynamicImage::ImageRgb8(image.to_rgb8())),
        ColorConversion::ToRgba => Ok(DynamicImage::ImageRgba8(image.to_rgba8())),
        ColorConversion::SwapRedBlue => swap_red_blue(image),
    }
}

fn swap_red_blue(image: DynamicImage) -> Result<DynamicImage, NoteError> {
    let image = to_8bit(image);
    let channels = image.color().channel_count();
    if channels < 3 {
        return Err(NoteError::UnsupportedChannelCount {
            operation: "swap_red_blue",
            expected: 3,
            actual: channels,
        });
    }

    let mut samples = image.as_bytes().to_vec();
    for pixel in samples.chunks_exact_mut(channels as usize) {
        pixel.swap(0, 2);
    }

    from_samples(image.width(), image.height(), channels, samples)
}
