use super::{from_samples, to_8bit};
use crate::error::NoteError;
use image::{DynamicImage, GenericImageView, GrayImage};

/// Keep pixels where `mask` is non-zero, zero everything else
pub fn apply(image: DynamicImage, mask: &GrayImage) -> Result<DynamicImage, NoteError> {
    let image = to_8bit(image);
    if image.dimensions() != mask.dimensions() {
        return Err(NoteError::DimensionMismatch {
            operation: "mask",
            expected: image.dimensions(),
            actual: mask.dimensions(),
        });
    }

    let channels = image.color().channel_count();
    let mut samples = image.as_bytes().to_vec();
    for (pixel, selected) in samples
        .chunks_exact_mut(channels as usize)
        .zip(mask.as_raw())
    {
        if *selected == 0 {
            pixel.fill(0);
        }
    }

    from_samples(image.width(), image.height(), channels, samples)
}
