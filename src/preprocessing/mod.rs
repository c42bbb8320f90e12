//! Configurable preprocessing sequences
//!
//! A closed set of pixel operations, a builder to chain them and an executor
//! that applies them in insertion order.

pub mod operation;
pub mod pipeline;
pub mod sequence;
pub mod steps;

pub use operation::Operation;
pub use pipeline::{execute, execute_timed, ExecutionReport, Executor, Preset, StepTiming};
pub use sequence::{Sequence, SequenceBuilder};
pub use steps::adaptive::{AdaptiveMethod, AdaptiveParams};
pub use steps::blur::BorderMode;
pub use steps::color::ColorConversion;
pub use steps::threshold::{ThresholdMode, ThresholdParams};
