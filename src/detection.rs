//! Labeled detections produced by the decoder and suppressor.

use crate::geometry::BoundingBox;
use crate::labels::LabelSet;

/// A scored box for one class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Index into the session's `LabelSet`.
    pub class_index: usize,
    /// Best class score, above the confidence threshold.
    pub score: f32,
    /// Box in model input space `[0, side - 1]`.
    pub bbox: BoundingBox,
}

impl Detection {
    /// Returns the class name, if the index is covered by `labels`.
    pub fn label<'a>(&self, labels: &'a LabelSet) -> Option<&'a str> {
        labels.get(self.class_index)
    }
}
