//! Per-class greedy non-maximum suppression.

use crate::detection::Detection;
use crate::geometry::iou;
use crate::trace::{trace_event, trace_span};
use crate::util::{check_threshold, YoloPostError, YoloPostResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

fn score_cmp_desc(a: &Detection, b: &Detection) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Sorts detections by descending score; equal scores keep their input order.
pub(crate) fn sort_detections_desc(detections: &mut [Detection]) {
    detections.sort_by(score_cmp_desc);
}

/// Greedy suppression within one class.
///
/// After sorting, a detection is kept if its IoU against every previously kept
/// detection is below `iou_threshold`. This equals repeatedly taking the best
/// remaining detection and dropping everything overlapping it. An undefined
/// (NaN) IoU counts as a duplicate.
pub fn nms_class(mut pool: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    sort_detections_desc(&mut pool);
    let mut kept: Vec<Detection> = Vec::new();

    'outer: for candidate in pool {
        for accepted in kept.iter() {
            let overlap = iou(&accepted.bbox, &candidate.bbox);
            if overlap.is_nan() || overlap >= iou_threshold {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }

    kept
}

/// Splits detections into per-class pools in class index order, rejecting
/// out-of-range classes. Only classes that occur get a pool.
fn class_pools(
    candidates: &[Detection],
    label_count: usize,
) -> YoloPostResult<Vec<Vec<Detection>>> {
    let mut pools: BTreeMap<usize, Vec<Detection>> = BTreeMap::new();
    for detection in candidates {
        if detection.class_index >= label_count {
            return Err(YoloPostError::ClassOutOfRange {
                index: detection.class_index,
                len: label_count,
            });
        }
        pools.entry(detection.class_index).or_default().push(*detection);
    }
    Ok(pools.into_values().collect())
}

/// Suppresses duplicate detections independently per class.
///
/// The result lists classes in index order and, within a class, detections in
/// descending score order. Any two kept detections of the same class have an
/// IoU below `iou_threshold`.
pub fn suppress(
    candidates: &[Detection],
    label_count: usize,
    iou_threshold: f32,
) -> YoloPostResult<Vec<Detection>> {
    suppress_with(candidates, label_count, iou_threshold, false)
}

/// Class-parallel variant of [`suppress`] with identical output.
#[cfg(feature = "rayon")]
pub fn suppress_par(
    candidates: &[Detection],
    label_count: usize,
    iou_threshold: f32,
) -> YoloPostResult<Vec<Detection>> {
    suppress_with(candidates, label_count, iou_threshold, true)
}

pub(crate) fn suppress_with(
    candidates: &[Detection],
    label_count: usize,
    iou_threshold: f32,
    parallel: bool,
) -> YoloPostResult<Vec<Detection>> {
    if label_count == 0 {
        return Err(YoloPostError::EmptyLabelSet);
    }
    let threshold = check_threshold("iou", iou_threshold)?;
    let pools = class_pools(candidates, label_count)?;

    let _span =
        trace_span!("suppress", candidates = candidates.len(), parallel = parallel).entered();

    #[cfg(feature = "rayon")]
    let per_class: Vec<Vec<Detection>> = if parallel {
        pools
            .into_par_iter()
            .map(|pool| nms_class(pool, threshold))
            .collect()
    } else {
        pools
            .into_iter()
            .map(|pool| nms_class(pool, threshold))
            .collect()
    };

    #[cfg(not(feature = "rayon"))]
    let per_class: Vec<Vec<Detection>> = {
        let _ = parallel;
        pools
            .into_iter()
            .map(|pool| nms_class(pool, threshold))
            .collect()
    };

    let kept: Vec<Detection> = per_class.into_iter().flatten().collect();
    trace_event!(
        "suppressed",
        kept = kept.len(),
        removed = candidates.len() - kept.len()
    );
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::{nms_class, sort_detections_desc, suppress};
    use crate::{BoundingBox, Detection};

    fn det(score: f32, left: f32, top: f32, right: f32, bottom: f32) -> Detection {
        Detection {
            class_index: 0,
            score,
            bbox: BoundingBox::new(left, top, right, bottom).unwrap(),
        }
    }

    #[test]
    fn sort_is_stable_for_equal_scores() {
        let mut dets = vec![
            det(0.5, 0.0, 0.0, 1.0, 1.0),
            det(0.9, 1.0, 1.0, 2.0, 2.0),
            det(0.5, 2.0, 2.0, 3.0, 3.0),
        ];
        sort_detections_desc(&mut dets);
        assert_eq!(dets[0].score, 0.9);
        assert_eq!(dets[1].bbox.left, 0.0);
        assert_eq!(dets[2].bbox.left, 2.0);
    }

    #[test]
    fn best_box_wins_regardless_of_input_order() {
        let kept = nms_class(
            vec![
                det(0.6, 1.0, 1.0, 11.0, 11.0),
                det(0.95, 0.0, 0.0, 10.0, 10.0),
                det(0.7, 2.0, 2.0, 12.0, 12.0),
            ],
            0.5,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.95);
    }

    #[test]
    fn chain_is_not_collapsed_transitively() {
        // a overlaps b, b overlaps c, a does not overlap c: b falls, c stays.
        let kept = nms_class(
            vec![
                det(0.9, 0.0, 0.0, 10.0, 10.0),
                det(0.8, 3.0, 0.0, 13.0, 10.0),
                det(0.7, 6.0, 0.0, 16.0, 10.0),
            ],
            0.5,
        );
        let scores: Vec<f32> = kept.iter().map(|d| d.score).collect();
        assert_eq!(scores, vec![0.9, 0.7]);
    }

    #[test]
    fn threshold_is_inclusive() {
        // IoU of these boxes is exactly 0.5.
        let kept = nms_class(
            vec![det(0.9, 0.0, 0.0, 3.0, 1.0), det(0.8, 1.0, 0.0, 4.0, 1.0)],
            0.5,
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn undefined_overlap_counts_as_duplicate() {
        let broken = Detection {
            class_index: 0,
            score: 0.9,
            bbox: BoundingBox {
                left: f32::NAN,
                top: 0.0,
                right: 10.0,
                bottom: 10.0,
            },
        };
        let kept = nms_class(vec![broken, Detection { score: 0.8, ..broken }], 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn huge_label_count_allocates_only_seen_classes() {
        let dets = vec![
            Detection {
                class_index: usize::MAX - 1,
                ..det(0.9, 0.0, 0.0, 10.0, 10.0)
            },
            det(0.8, 0.0, 0.0, 10.0, 10.0),
        ];
        let kept = suppress(&dets, usize::MAX, 0.5).unwrap();
        let classes: Vec<usize> = kept.iter().map(|d| d.class_index).collect();
        assert_eq!(classes, vec![0, usize::MAX - 1]);
    }
}
