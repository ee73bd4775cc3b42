//! Frame source helpers built on the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Images are scaled to the
//! model side with a triangle filter before packing, matching what a camera
//! frame source hands to the normalizer.

use crate::frame::{pack_rgb, OwnedFrame};
use crate::util::{YoloPostError, YoloPostResult};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::path::Path;

/// Scales an RGB image to `side x side` and packs its pixels.
pub fn frame_from_rgb_image(img: &RgbImage, side: usize) -> YoloPostResult<OwnedFrame> {
    let side_u32 = u32::try_from(side).map_err(|_| YoloPostError::InvalidSide { side })?;
    if side_u32 == 0 {
        return Err(YoloPostError::InvalidSide { side });
    }
    let data = if img.width() == side_u32 && img.height() == side_u32 {
        img.pixels()
            .map(|px| pack_rgb(px[0], px[1], px[2]))
            .collect()
    } else {
        image::imageops::resize(img, side_u32, side_u32, FilterType::Triangle)
            .pixels()
            .map(|px| pack_rgb(px[0], px[1], px[2]))
            .collect()
    };
    OwnedFrame::new(data, side)
}

/// Converts any decoded image to RGB and scales it to `side x side`.
pub fn frame_from_dynamic_image(img: &DynamicImage, side: usize) -> YoloPostResult<OwnedFrame> {
    frame_from_rgb_image(&img.to_rgb8(), side)
}

/// Loads an image from disk as a model-sized frame.
pub fn load_frame<P: AsRef<Path>>(path: P, side: usize) -> YoloPostResult<OwnedFrame> {
    let img = image::open(path).map_err(|err| YoloPostError::ImageIo {
        reason: err.to_string(),
    })?;
    frame_from_dynamic_image(&img, side)
}
