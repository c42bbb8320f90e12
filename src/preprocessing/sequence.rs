use super::operation::Operation;
use super::steps::{
    adaptive::AdaptiveMethod,
    blur::BorderMode,
    color::ColorConversion,
    threshold::{ThresholdMode, ThresholdParams},
};
use image::GrayImage;
use std::sync::Arc;

/// Ordered, immutable list of operations. Cloning shares the operations.
#[derive(Debug, Clone)]
pub struct Sequence {
    operations: Arc<[Operation]>,
}

impl Sequence {
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operation names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(Operation::name).collect()
    }
}

impl From<Vec<Operation>> for Sequence {
    fn from(operations: Vec<Operation>) -> Self {
        Self {
            operations: operations.into(),
        }
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Accumulates operations with a fluent API.
///
/// `build` hands out a snapshot and clears the builder.
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    operations: Vec<Operation>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_convert(&mut self, conversion: ColorConversion) -> &mut Self {
        self.push(Operation::ColorConvert { conversion })
    }

    pub fn blur(&mut self, window: (u32, u32), anchor: (i32, i32), border: BorderMode) -> &mut Self {
        self.push(Operation::Blur {
            window,
            anchor,
            border,
        })
    }

    pub fn simple_threshold(&mut self, cut: f64, max_value: f64, mode: ThresholdMode) -> &mut Self {
        self.push(Operation::Threshold {
            cut,
            params: ThresholdParams::new(max_value, mode),
        })
    }

    pub fn adaptive_threshold(
        &mut self,
        max_value: f64,
        mode: ThresholdMode,
        method: AdaptiveMethod,
        block_size: u32,
        constant: f64,
    ) -> &mut Self {
        self.push(Operation::adaptive_threshold(
            max_value, mode, method, block_size, constant,
        ))
    }

    pub fn mask(&mut self, mask: GrayImage) -> &mut Self {
        self.push(Operation::Mask { mask })
    }

    pub fn push(&mut self, operation: Operation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    /// Freeze the accumulated operations and reset the builder
    pub fn build(&mut self) -> Sequence {
        Sequence::from(std::mem::take(&mut self.operations))
    }
}
