//! Individual pixel transforms
//!
//! Each transform takes ownership of its input and returns a freshly
//! allocated buffer. Transforms work on 8-bit samples; wider inputs are
//! narrowed first, keeping their channel layout.

pub mod adaptive;
pub mod blur;
pub mod color;
pub mod mask;
pub mod threshold;

use crate::error::NoteError;
use image::{DynamicImage, GrayImage, ImageBuffer, LumaA, RgbImage, RgbaImage};

/// Narrow 16-bit and float images to the 8-bit variant with the same layout
pub(crate) fn to_8bit(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => image,
        DynamicImage::ImageLuma16(_) => DynamicImage::ImageLuma8(image.to_luma8()),
        DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgb32F(_) => {
            DynamicImage::ImageRgb8(image.to_rgb8())
        }
        _ => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}

/// Rebuild an 8-bit image with `channels` interleaved samples per pixel
pub(crate) fn from_samples(
    width: u32,
    height: u32,
    channels: u8,
    samples: Vec<u8>,
) -> Result<DynamicImage, NoteError> {
    let image = match channels {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        2 => ImageBuffer::<LumaA<u8>, _>::from_raw(width, height, samples)
            .map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, samples).map(DynamicImage::ImageRgba8),
        _ => None,
    };

    image.ok_or_else(|| {
        NoteError::ProcessingError(format!(
            "Cannot rebuild {}x{} image with {} channel(s)",
            width, height, channels
        ))
    })
}

/// Apply `f` to every sample of an 8-bit image, keeping its layout
pub(crate) fn map_samples<F>(image: DynamicImage, f: F) -> Result<DynamicImage, NoteError>
where
    F: Fn(u8) -> u8,
{
    let image = to_8bit(image);
    let channels = image.color().channel_count();
    let samples = image.as_bytes().iter().map(|&v| f(v)).collect();
    from_samples(image.width(), image.height(), channels, samples)
}

pub(crate) fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
