use super::contours::{find_contours, ApproximationMode, Contour, Rectangle, RetrievalMode};
use super::filter::AreaFilter;
use crate::error::NoteError;
use crate::io;
use crate::preprocessing::{execute, ColorConversion, Sequence, SequenceBuilder, ThresholdMode};
use crate::preprocessing::pipeline::{DEFAULT_THRESHOLD, MAX_VALUE};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use std::path::Path;

/// A cropped region of a page, owning its pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    image: DynamicImage,
    rect: Rectangle,
}

impl Note {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Where the note was cropped from in the source page
    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Splitter settings
#[derive(Debug, Clone, PartialEq)]
pub struct SplitterConfig {
    /// Cut value for the grayscale binarization
    pub threshold: f64,
    pub max_value: f64,
    pub area_filter: AreaFilter,
    pub retrieval: RetrievalMode,
    pub approximation: ApproximationMode,
    /// Sort notes top-to-bottom, then left-to-right
    pub reading_order: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_value: MAX_VALUE,
            area_filter: AreaFilter::default(),
            retrieval: RetrievalMode::List,
            approximation: ApproximationMode::Simple,
            reading_order: false,
        }
    }
}

/// Splits a page into notes: binarize, find regions, mask, filter, crop
#[derive(Debug, Clone)]
pub struct Splitter {
    config: SplitterConfig,
    binarize: Sequence,
}

impl Splitter {
    pub fn new(config: SplitterConfig) -> Result<Self, NoteError> {
        config.area_filter.validate()?;
        let binarize = SequenceBuilder::new()
            .color_convert(ColorConversion::ToGray)
            .simple_threshold(config.threshold, config.max_value, ThresholdMode::Binary)
            .build();

        Ok(Self { config, binarize })
    }

    /// Load a page from disk and split it
    pub fn split_file(&self, path: &Path) -> Result<Vec<Note>, NoteError> {
        let image = io::load_image(path)?;
        self.split(&image)
    }

    pub fn split(&self, image: &DynamicImage) -> Result<Vec<Note>, NoteError> {
        io::ensure_not_empty(image)?;

        let binary = execute(image.clone(), &self.binarize)?;
        let contours = find_contours(&binary, self.config.retrieval, self.config.approximation)?;

        let mask = region_mask(binary.width(), binary.height(), &contours);
        let composited = execute(image.clone(), &SequenceBuilder::new().mask(mask).build())?;

        let found = contours.len();
        let mut rects = self.config.area_filter.apply(contours);

        if self.config.reading_order {
            sort_reading_order(&mut rects);
        }

        tracing::info!(
            "Split {}x{} page: {} regions, {} notes",
            image.width(),
            image.height(),
            found,
            rects.len()
        );

        Ok(split_image(&composited, &rects))
    }
}

/// Crop one note per rectangle; rectangles are clipped to the image first
pub fn split_image(image: &DynamicImage, rects: &[Rectangle]) -> Vec<Note> {
    rects
        .iter()
        .map(|r| r.clamp_to(image.width(), image.height()))
        .filter(|r| !r.is_degenerate())
        .map(|rect| {
            tracing::debug!("Cropping note at {:?}", rect);
            Note {
                image: image.crop_imm(rect.x, rect.y, rect.width, rect.height),
                rect,
            }
        })
        .collect()
}

/// Generic splitting: run `sequence`, take the regions of its binary output
/// and crop them from the unprocessed image
pub fn split_with_sequence(
    image: &DynamicImage,
    sequence: &Sequence,
    retrieval: RetrievalMode,
    approximation: ApproximationMode,
    area_filter: &AreaFilter,
) -> Result<Vec<Note>, NoteError> {
    io::ensure_not_empty(image)?;
    area_filter.validate()?;

    let binary = execute(image.clone(), sequence)?;
    let contours = find_contours(&binary, retrieval, approximation)?;
    let rects = area_filter.apply(contours);

    Ok(split_image(image, &rects))
}

/// Top edge first, then left edge
pub fn sort_reading_order(rects: &mut [Rectangle]) {
    rects.sort_by_key(|r| (r.y, r.x));
}

/// Mask selecting the inside of every contour
fn region_mask(width: u32, height: u32, contours: &[Contour]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for contour in contours {
        fill_contour(&mut mask, contour, Luma([255]));
    }
    mask
}

/// Fill the contour polygon, boundary included
fn fill_contour(canvas: &mut GrayImage, contour: &Contour, color: Luma<u8>) {
    let mut points: Vec<Point<i32>> = contour.points.clone();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    match points.as_slice() {
        [] => {}
        [p] => {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < canvas.width() && (p.y as u32) < canvas.height() {
                canvas.put_pixel(p.x as u32, p.y as u32, color);
            }
        }
        [a, b] => draw_line_segment_mut(canvas, as_f32(*a), as_f32(*b), color),
        _ => {
            draw_polygon_mut(canvas, &points, color);
            // Border pixels belong to the region
            for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
                draw_line_segment_mut(canvas, as_f32(*a), as_f32(*b), color);
            }
        }
    }
}

fn as_f32(p: Point<i32>) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}
