//! Candidate pruning.
//!
//! Per-class greedy non-maximum suppression over decoded detections.

pub(crate) mod nms;
