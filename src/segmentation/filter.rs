//! Area-based noise filtering
//!
//! Two policies, selected explicitly:
//! - relative: drop regions much smaller than the largest one on the page
//! - absolute: drop regions under a fixed pixel-area floor
//!
//! Both boundaries are inclusive. Degenerate rectangles are always dropped.

use super::contours::{bounding_rects, Contour, Rectangle};
use crate::error::NoteError;

/// Smallest bounding-box area, in pixels, accepted as a note
pub const MINIMAL_NOTE_SIZE: f64 = 500.0;
/// Share of the largest contour area a contour must reach
pub const DEFAULT_AREA_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaFilter {
    /// Keep contours with `area >= ratio * max_area`
    RelativeToMax { ratio: f64 },
    /// Keep rectangles with `area >= min_area`
    AbsoluteMinimum { min_area: f64 },
}

impl Default for AreaFilter {
    fn default() -> Self {
        Self::AbsoluteMinimum {
            min_area: MINIMAL_NOTE_SIZE,
        }
    }
}

impl AreaFilter {
    pub fn relative(ratio: f64) -> Self {
        Self::RelativeToMax { ratio }
    }

    pub fn absolute(min_area: f64) -> Self {
        Self::AbsoluteMinimum { min_area }
    }

    pub fn validate(&self) -> Result<(), NoteError> {
        match *self {
            Self::RelativeToMax { ratio } if !(0.0..=1.0).contains(&ratio) => Err(
                NoteError::InvalidParameter(format!("area ratio must be within [0, 1], got {}", ratio)),
            ),
            Self::AbsoluteMinimum { min_area } if !min_area.is_finite() || min_area < 0.0 => {
                Err(NoteError::InvalidParameter(format!(
                    "minimum note size must be a non-negative number, got {}",
                    min_area
                )))
            }
            _ => Ok(()),
        }
    }

    /// Bounding rectangles of the contours this policy accepts, in contour order
    pub fn apply(&self, contours: Vec<Contour>) -> Vec<Rectangle> {
        let before = contours.len();
        let kept = match *self {
            Self::RelativeToMax { ratio } => {
                filter_rectangles(bounding_rects(&filter_contours(contours, ratio)), 0.0)
            }
            Self::AbsoluteMinimum { min_area } => {
                filter_rectangles(bounding_rects(&contours), min_area)
            }
        };

        tracing::debug!("Area filter {:?} kept {} of {} regions", self, kept.len(), before);
        kept
    }
}

/// Keep contours whose area reaches `ratio` times the largest contour area
pub fn filter_contours(contours: Vec<Contour>, ratio: f64) -> Vec<Contour> {
    let cutoff = contours.iter().map(Contour::area).fold(0.0, f64::max) * ratio;
    contours.into_iter().filter(|c| c.area() >= cutoff).collect()
}

/// Keep non-degenerate rectangles whose area reaches `min_area`
pub fn filter_rectangles(rects: Vec<Rectangle>, min_area: f64) -> Vec<Rectangle> {
    rects
        .into_iter()
        .filter(|r| !r.is_degenerate() && r.area() as f64 >= min_area)
        .collect()
}
