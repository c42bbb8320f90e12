use crate::error::NoteError;
use clap::ValueEnum;
use image::DynamicImage;
use imageproc::contours::{find_contours as trace_borders, BorderType};
use imageproc::point::Point;
use serde::Serialize;

/// Which borders to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RetrievalMode {
    /// Outermost borders only
    External,
    /// Every border, outer and hole, without hierarchy
    #[default]
    List,
}

/// How border points are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ApproximationMode {
    /// Every border pixel
    None,
    /// Only the points where the chain changes direction
    #[default]
    Simple,
}

/// Closed boundary of a connected foreground region
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Enclosed polygon area (shoelace formula)
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let twice_area: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
            })
            .sum();

        twice_area.abs() as f64 / 2.0
    }

    /// Smallest axis-aligned box covering every point
    pub fn bounding_rect(&self) -> Rectangle {
        let Some(first) = self.points.first() else {
            return Rectangle::default();
        };

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Rectangle {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        }
    }
}

/// Axis-aligned box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Zero width or zero height
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with a `width x height` image
    pub fn clamp_to(&self, width: u32, height: u32) -> Rectangle {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Rectangle {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }
}

/// Find the borders of the foreground (non-zero) regions of a binary image
pub fn find_contours(
    binary: &DynamicImage,
    retrieval: RetrievalMode,
    approximation: ApproximationMode,
) -> Result<Vec<Contour>, NoteError> {
    let channels = binary.color().channel_count();
    if channels != 1 {
        return Err(NoteError::UnsupportedChannelCount {
            operation: "find_contours",
            expected: 1,
            actual: channels,
        });
    }

    let gray = binary.to_luma8();
    let contours = trace_borders::<i32>(&gray)
        .into_iter()
        .filter(|c| match retrieval {
            RetrievalMode::List => true,
            RetrievalMode::External => {
                matches!(c.border_type, BorderType::Outer) && c.parent.is_none()
            }
        })
        .map(|c| match approximation {
            ApproximationMode::None => Contour::new(c.points),
            ApproximationMode::Simple => Contour::new(simplify_chain(&c.points)),
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        "Found {} contours ({:?}, {:?})",
        contours.len(),
        retrieval,
        approximation
    );

    Ok(contours)
}

/// One rectangle per contour, in contour order
pub fn bounding_rects(contours: &[Contour]) -> Vec<Rectangle> {
    contours.iter().map(Contour::bounding_rect).collect()
}

/// Drop points lying inside straight (horizontal, vertical, diagonal) runs
fn simplify_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let n = points.len();
    let simplified: Vec<Point<i32>> = (0..n)
        .filter_map(|i| {
            let prev = points[(i + n - 1) % n];
            let curr = points[i];
            let next = points[(i + 1) % n];

            let dir_prev = ((curr.x - prev.x).signum(), (curr.y - prev.y).signum());
            let dir_next = ((next.x - curr.x).signum(), (next.y - curr.y).signum());

            (dir_prev != dir_next).then_some(curr)
        })
        .collect();

    if simplified.len() < 2 {
        points.to_vec()
    } else {
        simplified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn filled_rect(width: u32, height: u32, rects: &[Rectangle]) -> DynamicImage {
        let mut img = GrayImage::new(width, height);
        for r in rects {
            for y in r.y..r.y + r.height {
                for x in r.x..r.x + r.width {
                    img.put_pixel(x, y, Luma([255]));
                }
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_single_rectangle_bounding_rect_is_exact() {
        let img = filled_rect(80, 50, &[Rectangle::new(10, 10, 40, 20)]);

        let contours = find_contours(&img, RetrievalMode::List, ApproximationMode::Simple).unwrap();
        let rects = bounding_rects(&contours);

        assert_eq!(rects, vec![Rectangle::new(10, 10, 40, 20)]);
    }

    #[test]
    fn test_simple_approximation_keeps_corners() {
        let img = filled_rect(80, 50, &[Rectangle::new(10, 10, 40, 20)]);

        let full = find_contours(&img, RetrievalMode::External, ApproximationMode::None).unwrap();
        let simple = find_contours(&img, RetrievalMode::External, ApproximationMode::Simple).unwrap();

        assert_eq!(simple.len(), 1);
        assert_eq!(simple[0].points.len(), 4);
        assert!(full[0].points.len() > simple[0].points.len());
        assert_eq!(full[0].bounding_rect(), simple[0].bounding_rect());
        // 39 x 19 between border pixel centres
        assert_eq!(simple[0].area(), 741.0);
    }

    #[test]
    fn test_external_skips_holes() {
        let mut img = filled_rect(60, 60, &[Rectangle::new(10, 10, 40, 40)]).to_luma8();
        for y in 20..30 {
            for x in 20..30 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let img = DynamicImage::ImageLuma8(img);

        let external = find_contours(&img, RetrievalMode::External, ApproximationMode::Simple).unwrap();
        let list = find_contours(&img, RetrievalMode::List, ApproximationMode::Simple).unwrap();

        assert_eq!(external.len(), 1);
        assert_eq!(list.len(), 2);
        assert_eq!(external[0].bounding_rect(), Rectangle::new(10, 10, 40, 40));
    }

    #[test]
    fn test_separate_regions_each_get_a_contour() {
        let img = filled_rect(
            100,
            60,
            &[Rectangle::new(5, 5, 20, 10), Rectangle::new(50, 30, 30, 20)],
        );

        let contours = find_contours(&img, RetrievalMode::External, ApproximationMode::Simple).unwrap();
        let mut rects = bounding_rects(&contours);
        rects.sort_by_key(|r| (r.y, r.x));

        assert_eq!(
            rects,
            vec![Rectangle::new(5, 5, 20, 10), Rectangle::new(50, 30, 30, 20)]
        );
    }

    #[test]
    fn test_blank_image_has_no_contours() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(20, 20));
        let contours = find_contours(&img, RetrievalMode::List, ApproximationMode::None).unwrap();
        assert!(contours.is_empty());
    }

    #[test]
    fn test_find_contours_requires_single_channel() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
        let err = find_contours(&img, RetrievalMode::List, ApproximationMode::None).unwrap_err();
        assert!(matches!(err, NoteError::UnsupportedChannelCount { .. }));
    }

    #[test]
    fn test_degenerate_contours() {
        assert_eq!(Contour::new(vec![]).bounding_rect(), Rectangle::default());
        assert!(Rectangle::default().is_degenerate());

        let single = Contour::new(vec![Point::new(3, 4)]);
        assert_eq!(single.bounding_rect(), Rectangle::new(3, 4, 1, 1));
        assert_eq!(single.area(), 0.0);
    }

    #[test]
    fn test_rectangle_clamping() {
        let clamped = Rectangle::new(90, 40, 20, 20).clamp_to(100, 50);
        assert_eq!(clamped, Rectangle::new(90, 40, 10, 10));

        assert!(Rectangle::new(120, 0, 5, 5).clamp_to(100, 50).is_degenerate());
    }
}
