//! Shared utility helpers.

pub mod error;

pub use error::{YoloPostError, YoloPostResult};

/// Checks that a threshold is finite and within `[0, 1]`.
pub(crate) fn check_threshold(name: &'static str, value: f32) -> YoloPostResult<f32> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(YoloPostError::InvalidThreshold { name, value })
    }
}
