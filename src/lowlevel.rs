//! Low-level building blocks for custom post-processing pipelines.
//!
//! These expose the individual decoding steps and the single-class
//! suppression loop. Most users should prefer `decode`, `suppress` or
//! `Detector`.

pub use crate::candidate::nms::nms_class;
pub use crate::decode::{best_class, transpose_class_major, BOX_PARAMS};
pub use crate::frame::{pack_rgb, unpack_rgb, BATCH_SIZE, CHANNELS, DEFAULT_SIDE};
pub use crate::geometry::overlap;
