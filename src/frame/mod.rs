//! Pixel frames and the channel-planar input tensor.
//!
//! A `PixelFrame` is a borrowed square grid of packed `0x??RRGGBB` pixels that
//! the frame source has already scaled to the model input side. `normalize`
//! splits it into three contiguous unit-scaled planes laid out as `[1, 3, S, S]`.

use crate::trace::{trace_event, trace_span};
use crate::util::{YoloPostError, YoloPostResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "image-io")]
pub mod io;

/// Batch size of the input tensor.
pub const BATCH_SIZE: usize = 1;
/// Number of color channels in the input tensor.
pub const CHANNELS: usize = 3;
/// Default model input side length.
pub const DEFAULT_SIDE: usize = 640;

const CHANNEL_SCALE: f32 = 255.0;

/// Packs 8-bit channels into a single pixel value.
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Extracts the red, green and blue channels of a packed pixel.
pub fn unpack_rgb(pixel: u32) -> [u8; 3] {
    [
        ((pixel >> 16) & 0xff) as u8,
        ((pixel >> 8) & 0xff) as u8,
        (pixel & 0xff) as u8,
    ]
}

fn area_for(side: usize) -> YoloPostResult<usize> {
    if side == 0 {
        return Err(YoloPostError::InvalidSide { side });
    }
    side.checked_mul(side)
        .filter(|area| area.checked_mul(CHANNELS).is_some())
        .ok_or(YoloPostError::InvalidSide { side })
}

/// Borrowed square frame of packed RGB pixels, row-major.
#[derive(Copy, Clone, Debug)]
pub struct PixelFrame<'a> {
    data: &'a [u32],
    side: usize,
}

impl<'a> PixelFrame<'a> {
    /// Creates a view over exactly `side * side` pixels.
    pub fn from_slice(data: &'a [u32], side: usize) -> YoloPostResult<Self> {
        let expected = area_for(side)?;
        if data.len() != expected {
            return Err(YoloPostError::FrameSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, side })
    }

    /// Returns the side length in pixels.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns the backing pixel slice.
    pub fn as_slice(&self) -> &'a [u32] {
        self.data
    }

    /// Returns the packed pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.side || y >= self.side {
            return None;
        }
        self.data.get(y * self.side + x).copied()
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&'a [u32]> {
        if y >= self.side {
            return None;
        }
        let start = y * self.side;
        self.data.get(start..start + self.side)
    }
}

/// Owned square frame of packed RGB pixels.
#[derive(Clone, Debug)]
pub struct OwnedFrame {
    data: Vec<u32>,
    side: usize,
}

impl OwnedFrame {
    /// Wraps `side * side` packed pixels.
    pub fn new(data: Vec<u32>, side: usize) -> YoloPostResult<Self> {
        PixelFrame::from_slice(&data, side)?;
        Ok(Self { data, side })
    }

    /// Packs an interleaved RGB8 buffer of `side * side * 3` bytes.
    pub fn from_rgb8(rgb: &[u8], side: usize) -> YoloPostResult<Self> {
        let expected = area_for(side)?;
        if rgb.len() != expected * CHANNELS {
            return Err(YoloPostError::FrameSizeMismatch {
                expected,
                got: rgb.len() / CHANNELS,
            });
        }
        let data = rgb
            .chunks_exact(CHANNELS)
            .map(|px| pack_rgb(px[0], px[1], px[2]))
            .collect();
        Ok(Self { data, side })
    }

    /// Returns a borrowed view.
    pub fn view(&self) -> PixelFrame<'_> {
        PixelFrame {
            data: &self.data,
            side: self.side,
        }
    }

    /// Returns the side length in pixels.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns the packed pixels.
    pub fn data(&self) -> &[u32] {
        &self.data
    }
}

/// Channel-planar `[1, 3, S, S]` tensor with values in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
    side: usize,
}

impl InputTensor {
    /// Returns the logical shape `[batch, channels, side, side]`.
    pub fn shape(&self) -> [usize; 4] {
        [BATCH_SIZE, CHANNELS, self.side, self.side]
    }

    /// Returns the side length.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns the flat buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the plane for `channel` (0 red, 1 green, 2 blue).
    pub fn plane(&self, channel: usize) -> Option<&[f32]> {
        let area = self.side * self.side;
        let start = channel.checked_mul(area)?;
        self.data.get(start..start.checked_add(area)?)
    }

    /// Consumes the tensor and returns the flat buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

/// Converts a frame into a channel-planar unit-scaled tensor.
///
/// Every pixel of the `side * side` grid is written; the frame must have
/// exactly that side.
pub fn normalize(frame: PixelFrame<'_>, side: usize) -> YoloPostResult<InputTensor> {
    normalize_with(frame, side, false)
}

/// Row-parallel variant of [`normalize`] with identical output.
#[cfg(feature = "rayon")]
pub fn normalize_par(frame: PixelFrame<'_>, side: usize) -> YoloPostResult<InputTensor> {
    normalize_with(frame, side, true)
}

pub(crate) fn normalize_with(
    frame: PixelFrame<'_>,
    side: usize,
    parallel: bool,
) -> YoloPostResult<InputTensor> {
    let area = area_for(side)?;
    if frame.side() != side {
        return Err(YoloPostError::FrameSizeMismatch {
            expected: area,
            got: frame.as_slice().len(),
        });
    }

    let _span = trace_span!("normalize", side = side, parallel = parallel).entered();

    let mut data = vec![0.0f32; CHANNELS * area];
    let (red, rest) = data.split_at_mut(area);
    let (green, blue) = rest.split_at_mut(area);
    let pixels = frame.as_slice();

    #[cfg(feature = "rayon")]
    {
        if parallel {
            red.par_chunks_mut(side)
                .zip(green.par_chunks_mut(side))
                .zip(blue.par_chunks_mut(side))
                .zip(pixels.par_chunks(side))
                .for_each(|(((r, g), b), px)| fill_planes(px, r, g, b));
        } else {
            fill_planes(pixels, red, green, blue);
        }
    }

    #[cfg(not(feature = "rayon"))]
    {
        let _ = parallel;
        fill_planes(pixels, red, green, blue);
    }

    trace_event!("normalized", values = data.len());
    Ok(InputTensor { data, side })
}

fn fill_planes(pixels: &[u32], red: &mut [f32], green: &mut [f32], blue: &mut [f32]) {
    for (idx, &pixel) in pixels.iter().enumerate() {
        let [r, g, b] = unpack_rgb(pixel);
        red[idx] = f32::from(r) / CHANNEL_SCALE;
        green[idx] = f32::from(g) / CHANNEL_SCALE;
        blue[idx] = f32::from(b) / CHANNEL_SCALE;
    }
}
