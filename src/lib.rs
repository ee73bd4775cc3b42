//! yolopost turns a camera frame and a raw detector output into labeled,
//! de-duplicated bounding boxes.
//!
//! The crate covers the CPU side of a single-stage detector around an external
//! inference engine: frame normalization into a `[1, 3, S, S]` tensor,
//! decoding of the class-major `[4 + classes, N]` output, and per-class greedy
//! non-maximum suppression. Parallelism is available via the `rayon` feature,
//! image loading via `image-io`, and structured logging via `tracing`.

mod candidate;
pub mod decode;
pub mod detection;
pub mod frame;
pub mod geometry;
pub mod labels;
pub mod lowlevel;
pub mod pipeline;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use frame::io;

pub use candidate::nms::suppress;
#[cfg(feature = "rayon")]
pub use candidate::nms::suppress_par;
pub use decode::{decode, RawOutput, RawTensor};
pub use detection::Detection;
pub use frame::{normalize, InputTensor, OwnedFrame, PixelFrame};
#[cfg(feature = "rayon")]
pub use frame::normalize_par;
pub use geometry::{intersection_area, iou, union_area, BoundingBox};
pub use labels::LabelSet;
pub use pipeline::{postprocess, Detector, InferenceEngine, PipelineConfig};
pub use util::{YoloPostError, YoloPostResult};
