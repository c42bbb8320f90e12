use super::{from_samples, saturate, to_8bit};
use crate::error::NoteError;
use image::DynamicImage;

/// How samples outside the image are synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Outside samples are zero
    Constant,
    /// `aaaaaa|abcdefgh|hhhhhhh`
    Replicate,
    /// `fedcba|abcdefgh|hgfedcb`
    Reflect,
    /// `gfedcb|abcdefgh|gfedcba`
    #[default]
    Reflect101,
    /// `cdefgh|abcdefgh|abcdefg`
    Wrap,
}

/// Normalized box filter over a `window.0 x window.1` neighborhood.
///
/// `anchor` is the position of the filtered pixel inside the window;
/// a negative coordinate selects the window centre.
pub fn apply(
    image: DynamicImage,
    window: (u32, u32),
    anchor: (i32, i32),
    border: BorderMode,
) -> Result<DynamicImage, NoteError> {
    let (window_w, window_h) = window;
    if window_w == 0 || window_h == 0 {
        return Err(NoteError::InvalidParameter(format!(
            "blur window must be at least 1x1, got {}x{}",
            window_w, window_h
        )));
    }
    let anchor_x = resolve_anchor(anchor.0, window_w)?;
    let anchor_y = resolve_anchor(anchor.1, window_h)?;

    let kernel_x = vec![1.0 / window_w as f32; window_w as usize];
    let kernel_y = vec![1.0 / window_h as f32; window_h as usize];

    let image = to_8bit(image);
    let (width, height) = (image.width() as usize, image.height() as usize);
    let channels = image.color().channel_count() as usize;
    let samples = image.as_bytes();

    let mut output = vec![0u8; samples.len()];
    for channel in 0..channels {
        let plane: Vec<f32> = samples
            .iter()
            .skip(channel)
            .step_by(channels)
            .map(|&v| v as f32)
            .collect();

        let filtered = separable_filter(
            &plane,
            width,
            height,
            &kernel_x,
            &kernel_y,
            (anchor_x, anchor_y),
            border,
        );

        for (i, value) in filtered.into_iter().enumerate() {
            output[i * channels + channel] = saturate(value);
        }
    }

    from_samples(image.width(), image.height(), channels as u8, output)
}

fn resolve_anchor(anchor: i32, size: u32) -> Result<usize, NoteError> {
    if anchor < 0 {
        return Ok((size / 2) as usize);
    }
    if anchor as u32 >= size {
        return Err(NoteError::InvalidParameter(format!(
            "anchor {} lies outside a window of size {}",
            anchor, size
        )));
    }
    Ok(anchor as usize)
}

/// Correlate a single plane with a row kernel, then a column kernel
pub(crate) fn separable_filter(
    plane: &[f32],
    width: usize,
    height: usize,
    kernel_x: &[f32],
    kernel_y: &[f32],
    anchor: (usize, usize),
    border: BorderMode,
) -> Vec<f32> {
    let mut rows = vec![0.0f32; plane.len()];
    for y in 0..height {
        let row = &plane[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel_x.iter().enumerate() {
                let sx = x as isize + k as isize - anchor.0 as isize;
                if let Some(sx) = border_index(sx, width, border) {
                    acc += weight * row[sx];
                }
            }
            rows[y * width + x] = acc;
        }
    }

    let mut output = vec![0.0f32; plane.len()];
    for y in 0..height {
        for (k, weight) in kernel_y.iter().enumerate() {
            let sy = y as isize + k as isize - anchor.1 as isize;
            let Some(sy) = border_index(sy, height, border) else {
                continue;
            };
            let src = &rows[sy * width..(sy + 1) * width];
            let dst = &mut output[y * width..(y + 1) * width];
            for (d, s) in dst.iter_mut().zip(src) {
                *d += weight * s;
            }
        }
    }

    output
}

/// Map a possibly out-of-range coordinate back into `0..len`
fn border_index(i: isize, len: usize, mode: BorderMode) -> Option<usize> {
    let n = len as isize;
    if (0..n).contains(&i) {
        return Some(i as usize);
    }

    match mode {
        BorderMode::Constant => None,
        BorderMode::Replicate => Some(i.clamp(0, n - 1) as usize),
        BorderMode::Wrap => Some(i.rem_euclid(n) as usize),
        BorderMode::Reflect | BorderMode::Reflect101 => {
            if n == 1 {
                return Some(0);
            }
            let shift = if mode == BorderMode::Reflect101 { 1 } else { 0 };
            let mut i = i;
            loop {
                if i < 0 {
                    i = -i - 1 + shift;
                } else if i >= n {
                    i = 2 * n - i - 1 - shift;
                } else {
                    return Some(i as usize);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_border_index_modes() {
        assert_eq!(border_index(-1, 5, BorderMode::Constant), None);
        assert_eq!(border_index(-2, 5, BorderMode::Replicate), Some(0));
        assert_eq!(border_index(6, 5, BorderMode::Replicate), Some(4));
        assert_eq!(border_index(-1, 5, BorderMode::Reflect), Some(0));
        assert_eq!(border_index(5, 5, BorderMode::Reflect), Some(4));
        assert_eq!(border_index(-1, 5, BorderMode::Reflect101), Some(1));
        assert_eq!(border_index(5, 5, BorderMode::Reflect101), Some(3));
        assert_eq!(border_index(-1, 5, BorderMode::Wrap), Some(4));
        assert_eq!(border_index(7, 5, BorderMode::Wrap), Some(2));
        assert_eq!(border_index(-9, 1, BorderMode::Reflect101), Some(0));
    }

    #[test]
    fn test_blur_keeps_uniform_image() {
        let img = GrayImage::from_pixel(12, 9, Luma([77]));
        let result = apply(DynamicImage::ImageLuma8(img), (5, 5), (-1, -1), BorderMode::Reflect101)
            .unwrap();

        assert!(result.to_luma8().pixels().all(|p| p.0[0] == 77));
    }

    #[test]
    fn test_blur_averages_window() {
        // Single bright pixel spreads evenly over a 3x3 window
        let mut img = GrayImage::new(9, 9);
        img.put_pixel(4, 4, Luma([90]));

        let result = apply(DynamicImage::ImageLuma8(img), (3, 3), (-1, -1), BorderMode::Constant)
            .unwrap()
            .to_luma8();

        assert_eq!(result.get_pixel(4, 4).0[0], 10);
        assert_eq!(result.get_pixel(3, 3).0[0], 10);
        assert_eq!(result.get_pixel(5, 5).0[0], 10);
        assert_eq!(result.get_pixel(6, 4).0[0], 0);
    }

    #[test]
    fn test_blur_constant_border_darkens_edges() {
        let img = GrayImage::from_pixel(6, 6, Luma([90]));
        let result = apply(DynamicImage::ImageLuma8(img), (3, 3), (-1, -1), BorderMode::Constant)
            .unwrap()
            .to_luma8();

        // Corner window sees 4 of 9 in-image samples
        assert_eq!(result.get_pixel(0, 0).0[0], 40);
        assert_eq!(result.get_pixel(3, 3).0[0], 90);
    }

    #[test]
    fn test_blur_even_window_with_anchor() {
        // Anchor at the window origin averages the pixel and its right neighbour
        let img = GrayImage::from_fn(4, 1, |x, _| Luma([if x == 1 { 100 } else { 0 }]));
        let result = apply(DynamicImage::ImageLuma8(img), (2, 1), (0, 0), BorderMode::Replicate)
            .unwrap()
            .to_luma8();

        assert_eq!(result.get_pixel(0, 0).0[0], 50);
        assert_eq!(result.get_pixel(1, 0).0[0], 50);
        assert_eq!(result.get_pixel(2, 0).0[0], 0);
    }

    #[test]
    fn test_blur_filters_every_channel() {
        let img = RgbImage::from_pixel(4, 4, Rgb([10, 100, 200]));
        let result = apply(DynamicImage::ImageRgb8(img), (3, 3), (-1, -1), BorderMode::Replicate)
            .unwrap();

        assert_eq!(result.color(), image::ColorType::Rgb8);
        assert_eq!(result.to_rgb8().get_pixel(0, 3).0, [10, 100, 200]);
    }

    #[test]
    fn test_blur_rejects_bad_parameters() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        assert!(apply(img.clone(), (0, 3), (-1, -1), BorderMode::Reflect101).is_err());
        assert!(apply(img, (3, 3), (3, 0), BorderMode::Reflect101).is_err());
    }
}
