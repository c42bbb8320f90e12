use super::blur::{separable_filter, BorderMode};
use super::threshold::{classify, ThresholdMode, ThresholdParams};
use crate::error::NoteError;
use image::{DynamicImage, GrayImage, Luma};

/// Local statistic used as the per-pixel cut value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdaptiveMethod {
    /// Plain mean of the block
    #[default]
    Mean,
    /// Gaussian-weighted mean of the block
    Gaussian,
}

/// Adaptive threshold settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveParams {
    pub threshold: ThresholdParams,
    pub method: AdaptiveMethod,
    /// Side of the square neighborhood, odd and greater than 1
    pub block_size: u32,
    /// Subtracted from the local statistic
    pub constant: f64,
}

/// Binarize a grayscale image against a per-pixel cut value:
/// `cut(p) = statistic(block around p) - constant`.
pub fn apply(image: DynamicImage, params: &AdaptiveParams) -> Result<DynamicImage, NoteError> {
    let channels = image.color().channel_count();
    if channels != 1 {
        return Err(NoteError::UnsupportedChannelCount {
            operation: "adaptive_threshold",
            expected: 1,
            actual: channels,
        });
    }
    if params.block_size < 3 || params.block_size % 2 == 0 {
        return Err(NoteError::InvalidParameter(format!(
            "adaptive threshold block size must be odd and greater than 1, got {}",
            params.block_size
        )));
    }
    if !matches!(
        params.threshold.mode,
        ThresholdMode::Binary | ThresholdMode::BinaryInverse
    ) {
        return Err(NoteError::InvalidParameter(format!(
            "adaptive threshold supports only binary modes, got {:?}",
            params.threshold.mode
        )));
    }
    if !params.constant.is_finite() {
        return Err(NoteError::InvalidParameter(format!(
            "adaptive threshold constant must be finite, got {}",
            params.constant
        )));
    }

    let max = params.threshold.max_sample()?;
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();

    let statistic = match params.method {
        AdaptiveMethod::Mean => local_mean(&gray, params.block_size),
        AdaptiveMethod::Gaussian => local_gaussian(&gray, params.block_size),
    };

    let binarized = GrayImage::from_fn(width, height, |x, y| {
        let index = (y * width + x) as usize;
        let cut = statistic[index] - params.constant;
        let pixel = gray.get_pixel(x, y).0[0];
        Luma([classify(pixel, cut, max, params.threshold.mode)])
    });

    Ok(DynamicImage::ImageLuma8(binarized))
}

/// Block mean over the window clipped to the image
fn local_mean(img: &GrayImage, block_size: u32) -> Vec<f64> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let half = block_size as usize / 2;
    let stride = width + 1;
    let table = summed_area_table(img);

    let mut means = Vec::with_capacity(width * height);
    for y in 0..height {
        let (top, bottom) = (y.saturating_sub(half), (y + half + 1).min(height));
        for x in 0..width {
            let (left, right) = (x.saturating_sub(half), (x + half + 1).min(width));
            let sum = table[bottom * stride + right] + table[top * stride + left]
                - table[top * stride + right]
                - table[bottom * stride + left];
            let count = (right - left) * (bottom - top);
            means.push(sum as f64 / count as f64);
        }
    }
    means
}

/// Row-major `(height + 1) x (width + 1)` table; entry `(y, x)` is the sum
/// of all pixels above and left of it
fn summed_area_table(img: &GrayImage) -> Vec<u64> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let stride = width + 1;
    let samples = img.as_raw();
    let mut table = vec![0u64; stride * (height + 1)];

    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += u64::from(samples[y * width + x]);
            table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
        }
    }
    table
}

fn local_gaussian(img: &GrayImage, block_size: u32) -> Vec<f64> {
    let kernel = gaussian_kernel(block_size as usize);
    let plane: Vec<f32> = img.as_raw().iter().map(|&v| v as f32).collect();
    let center = block_size as usize / 2;

    separable_filter(
        &plane,
        img.width() as usize,
        img.height() as usize,
        &kernel,
        &kernel,
        (center, center),
        BorderMode::Replicate,
    )
    .into_iter()
    .map(f64::from)
    .collect()
}

/// Normalized 1-D Gaussian with sigma derived from the kernel size
fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;

    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();

    weights.into_iter().map(|w| w / sum).collect()
}
