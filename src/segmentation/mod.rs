//! Finding and cropping notes
//!
//! Contours are traced on a binary image, reduced to bounding rectangles,
//! filtered by area and cropped out of the page.

pub mod contours;
pub mod filter;
pub mod splitter;

pub use contours::Rectangle;
pub use filter::AreaFilter;
pub use splitter::{split_with_sequence, Note, Splitter, SplitterConfig};
