//! Error types for yolopost.

use thiserror::Error;

/// Result alias for yolopost operations.
pub type YoloPostResult<T> = std::result::Result<T, YoloPostError>;

/// Errors that can occur while post-processing a frame.
///
/// Every variant is scoped to a single pipeline pass: callers are expected to
/// log it, drop the frame and continue with the next one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum YoloPostError {
    /// The square side length is zero or overflows the buffer size.
    #[error("invalid side length {side}")]
    InvalidSide { side: usize },
    /// The pixel buffer does not hold exactly `side * side` pixels.
    #[error("frame size mismatch: expected {expected} pixels, got {got}")]
    FrameSizeMismatch { expected: usize, got: usize },
    /// A tensor buffer does not match its declared shape.
    #[error("tensor buffer length mismatch: shape needs {needed} values, got {got}")]
    BufferLengthMismatch { needed: usize, got: usize },
    /// The tensor shape cannot be interpreted as `[R, N]` or `[1, R, N]`.
    #[error("invalid tensor shape: {reason}")]
    InvalidShape { reason: &'static str },
    /// The output row count is not `4 + label_count`.
    #[error("output has {rows} rows, expected {expected} (4 box parameters + {label_count} classes)")]
    RowCountMismatch {
        rows: usize,
        expected: usize,
        label_count: usize,
    },
    /// The label set holds no labels.
    #[error("label set is empty")]
    EmptyLabelSet,
    /// A detection refers to a class outside the label set.
    #[error("class index {index} out of range for {len} labels")]
    ClassOutOfRange { index: usize, len: usize },
    /// A threshold parameter is not a finite value in `[0, 1]`.
    #[error("invalid {name} threshold: {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
    /// Box corners are unordered or not finite.
    #[error("invalid bounding box: {reason}")]
    InvalidBox { reason: &'static str },
    /// Reading the label resource failed.
    #[error("label io error: {reason}")]
    LabelIo { reason: String },
    /// Image decoding failed (only produced with the `image-io` feature).
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// The inference collaborator failed to produce an output.
    #[error("inference failed: {reason}")]
    Inference { reason: String },
}
