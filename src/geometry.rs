//! Axis-aligned boxes and overlap measures.
//!
//! Boxes are stored in corner form in model input space. Overlap along each
//! axis is computed from the interval center and extent, so the same helper
//! serves both x and y.

use crate::util::{YoloPostError, YoloPostResult};

/// Axis-aligned box in corner form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Left edge (minimum x).
    pub left: f32,
    /// Top edge (minimum y).
    pub top: f32,
    /// Right edge (maximum x).
    pub right: f32,
    /// Bottom edge (maximum y).
    pub bottom: f32,
}

impl BoundingBox {
    /// Creates a box, rejecting non-finite or unordered corners.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> YoloPostResult<Self> {
        if ![left, top, right, bottom].iter().all(|v| v.is_finite()) {
            return Err(YoloPostError::InvalidBox {
                reason: "non-finite coordinate",
            });
        }
        if left > right || top > bottom {
            return Err(YoloPostError::InvalidBox {
                reason: "corners are not ordered",
            });
        }
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Converts a center-form box and clamps it to `[0, side - 1]`.
    ///
    /// Negative extents are folded so the result is always ordered.
    pub fn from_center_clamped(cx: f32, cy: f32, w: f32, h: f32, side: usize) -> Self {
        let max = side.saturating_sub(1) as f32;
        let (x0, x1) = ordered(cx - w / 2.0, cx + w / 2.0);
        let (y0, y1) = ordered(cy - h / 2.0, cy + h / 2.0);
        Self {
            left: x0.max(0.0).min(max),
            top: y0.max(0.0).min(max),
            right: x1.min(max).max(0.0),
            bottom: y1.min(max).max(0.0),
        }
    }

    /// Returns the horizontal extent.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Returns the vertical extent.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Returns `width * height`.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Returns the box center `(x, y)`.
    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Returns true when every corner lies within `[0, side - 1]`.
    pub fn within(&self, side: usize) -> bool {
        let max = side.saturating_sub(1) as f32;
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|v| (0.0..=max).contains(v))
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Overlap length of two 1-D intervals given as center and extent.
///
/// Negative when the intervals are apart.
pub fn overlap(c1: f32, w1: f32, c2: f32, w2: f32) -> f32 {
    let left = (c1 - w1 / 2.0).max(c2 - w2 / 2.0);
    let right = (c1 + w1 / 2.0).min(c2 + w2 / 2.0);
    right - left
}

/// Intersection area of two boxes, zero when they do not touch.
pub fn intersection_area(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let w = overlap(ax, a.width(), bx, b.width());
    let h = overlap(ay, a.height(), by, b.height());
    if w < 0.0 || h < 0.0 {
        0.0
    } else {
        w * h
    }
}

/// Union area of two boxes.
pub fn union_area(a: &BoundingBox, b: &BoundingBox) -> f32 {
    a.area() + b.area() - intersection_area(a, b)
}

/// Intersection over union; zero when the union is empty.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let union = union_area(a, b);
    if union > 0.0 {
        intersection_area(a, b) / union
    } else {
        0.0
    }
}
