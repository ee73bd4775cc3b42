//! Decoding of class-major detector output into candidate detections.
//!
//! The network emits `[R, N]` with `R = 4 + classes`: row 0..4 hold
//! `cx, cy, w, h` for all `N` candidates, the remaining rows hold one class
//! score each. Decoding transposes this into `[N, R]` rows, picks the best
//! class per row and keeps the rows whose best score clears the confidence
//! threshold.

use crate::detection::Detection;
use crate::geometry::BoundingBox;
use crate::trace::{trace_event, trace_span};
use crate::util::{check_threshold, YoloPostError, YoloPostResult};

/// Number of box parameters preceding the class scores in each row.
pub const BOX_PARAMS: usize = 4;

/// Borrowed class-major `[rows, cols]` output tensor.
#[derive(Copy, Clone, Debug)]
pub struct RawOutput<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> RawOutput<'a> {
    /// Creates a view over `rows * cols` values. `cols` may be zero.
    pub fn from_slice(data: &'a [f32], rows: usize, cols: usize) -> YoloPostResult<Self> {
        let needed = rows
            .checked_mul(cols)
            .ok_or(YoloPostError::InvalidShape {
                reason: "element count overflows",
            })?;
        if data.len() != needed {
            return Err(YoloPostError::BufferLengthMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Creates a view from a full tensor shape, `[R, N]` or `[1, R, N]`.
    pub fn from_shape(data: &'a [f32], shape: &[usize]) -> YoloPostResult<Self> {
        let (rows, cols) = rows_cols(shape)?;
        Self::from_slice(data, rows, cols)
    }

    /// Returns the number of parameter rows (`4 + classes`).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of candidates.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns parameter row `r` across all candidates.
    pub fn row(&self, r: usize) -> Option<&'a [f32]> {
        if r >= self.rows {
            return None;
        }
        let start = r * self.cols;
        self.data.get(start..start + self.cols)
    }
}

fn rows_cols(shape: &[usize]) -> YoloPostResult<(usize, usize)> {
    match *shape {
        [rows, cols] => Ok((rows, cols)),
        [1, rows, cols] => Ok((rows, cols)),
        [_, _, _] => Err(YoloPostError::InvalidShape {
            reason: "batch dimension must be 1",
        }),
        _ => Err(YoloPostError::InvalidShape {
            reason: "expected [rows, cols] or [1, rows, cols]",
        }),
    }
}

/// Owned class-major output tensor as returned by an inference engine.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTensor {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl RawTensor {
    /// Wraps `rows * cols` values.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> YoloPostResult<Self> {
        RawOutput::from_slice(&data, rows, cols)?;
        Ok(Self { data, rows, cols })
    }

    /// Wraps values with a full tensor shape, `[R, N]` or `[1, R, N]`.
    pub fn from_shape(data: Vec<f32>, shape: &[usize]) -> YoloPostResult<Self> {
        let (rows, cols) = rows_cols(shape)?;
        Self::new(data, rows, cols)
    }

    /// Returns a borrowed view.
    pub fn view(&self) -> RawOutput<'_> {
        RawOutput {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

/// Transposes a row-major `[rows, cols]` buffer into `[cols, rows]`.
///
/// Output element `(j, i)` is input element `(i, j)`.
pub fn transpose_class_major(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    debug_assert_eq!(data.len(), rows * cols);
    let mut out = vec![0.0f32; data.len()];
    for (i, row) in data.chunks_exact(cols.max(1)).take(rows).enumerate() {
        for (j, &value) in row.iter().enumerate() {
            out[j * rows + i] = value;
        }
    }
    out
}

/// Returns the index and value of the highest score.
///
/// The incumbent only changes on a strictly greater score, so ties keep the
/// lowest index. Scores at or below zero never win.
pub fn best_class(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    let mut max_score = 0.0f32;
    for (idx, &score) in scores.iter().enumerate() {
        if score > max_score {
            max_score = score;
            best = Some((idx, score));
        }
    }
    best
}

/// Decodes class-major output into thresholded candidate detections.
///
/// Boxes are converted from center form and clamped to `[0, side - 1]`.
/// Candidates with a best score above 1 or any non-finite value are skipped,
/// so every score lies in `(threshold, 1]`. Candidates keep their column
/// order; an output with no columns yields an empty list.
pub fn decode(
    raw: RawOutput<'_>,
    label_count: usize,
    side: usize,
    confidence_threshold: f32,
) -> YoloPostResult<Vec<Detection>> {
    if label_count == 0 {
        return Err(YoloPostError::EmptyLabelSet);
    }
    if side == 0 {
        return Err(YoloPostError::InvalidSide { side });
    }
    let threshold = check_threshold("confidence", confidence_threshold)?;
    let expected = label_count
        .checked_add(BOX_PARAMS)
        .ok_or(YoloPostError::InvalidShape {
            reason: "label count overflows row count",
        })?;
    if raw.rows() != expected {
        return Err(YoloPostError::RowCountMismatch {
            rows: raw.rows(),
            expected,
            label_count,
        });
    }

    let _span = trace_span!("decode", candidates = raw.cols(), classes = label_count).entered();

    let rows = raw.rows();
    let table = transpose_class_major(raw.as_slice(), rows, raw.cols());
    let mut detections = Vec::new();
    let mut skipped = 0usize;
    for candidate in table.chunks_exact(rows) {
        let Some((class_index, score)) = best_class(&candidate[BOX_PARAMS..]) else {
            continue;
        };
        if score <= threshold {
            continue;
        }
        let [cx, cy, w, h] = [candidate[0], candidate[1], candidate[2], candidate[3]];
        if score > 1.0 || ![score, cx, cy, w, h].iter().all(|v| v.is_finite()) {
            skipped += 1;
            continue;
        }
        detections.push(Detection {
            class_index,
            score,
            bbox: BoundingBox::from_center_clamped(cx, cy, w, h, side),
        });
    }

    trace_event!(
        "decoded",
        kept = detections.len(),
        skipped = skipped
    );
    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::{best_class, transpose_class_major};

    #[test]
    fn transpose_swaps_axes() {
        // [[1, 2, 3], [4, 5, 6]] -> [[1, 4], [2, 5], [3, 6]]
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = transpose_class_major(&data, 2, 3);
        assert_eq!(out, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn transpose_handles_empty_columns() {
        assert!(transpose_class_major(&[], 6, 0).is_empty());
    }

    #[test]
    fn best_class_keeps_first_of_ties() {
        assert_eq!(best_class(&[0.2, 0.7, 0.7, 0.1]), Some((1, 0.7)));
    }

    #[test]
    fn best_class_ignores_non_positive_scores() {
        assert_eq!(best_class(&[0.0, -1.0]), None);
        assert_eq!(best_class(&[]), None);
    }
}
