//! Frame-to-detections pipeline around an external inference engine.
//!
//! `Detector` owns the immutable session state (labels, configuration) and an
//! engine. Each call is an independent pass: a failure affects only that
//! frame and the detector stays usable for the next one.

use crate::candidate::nms::suppress_with;
use crate::decode::{decode, RawOutput, RawTensor};
use crate::detection::Detection;
use crate::frame::{normalize_with, InputTensor, PixelFrame, DEFAULT_SIDE};
use crate::labels::LabelSet;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{check_threshold, YoloPostError, YoloPostResult};

/// Tunable parameters for a detection session.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Model input side length in pixels.
    pub side: usize,
    /// Minimum best-class score; candidates must score strictly above it.
    pub confidence_threshold: f32,
    /// IoU at or above which same-class boxes are treated as duplicates.
    pub iou_threshold: f32,
    /// Use rayon for normalization and per-class suppression when available.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            side: DEFAULT_SIDE,
            confidence_threshold: 0.45,
            iou_threshold: 0.5,
            parallel: false,
        }
    }
}

impl PipelineConfig {
    /// Checks the side length and both thresholds.
    pub fn validate(&self) -> YoloPostResult<()> {
        if self.side == 0 {
            return Err(YoloPostError::InvalidSide { side: self.side });
        }
        check_threshold("confidence", self.confidence_threshold)?;
        check_threshold("iou", self.iou_threshold)?;
        Ok(())
    }
}

/// Executes the network on a normalized input.
///
/// The engine receives ownership of the tensor and must return a class-major
/// `[4 + classes, N]` output. How inference runs is up to the implementation;
/// failures should be reported as [`YoloPostError::Inference`].
pub trait InferenceEngine {
    fn infer(&mut self, input: InputTensor) -> YoloPostResult<RawTensor>;
}

impl<F> InferenceEngine for F
where
    F: FnMut(InputTensor) -> YoloPostResult<RawTensor>,
{
    fn infer(&mut self, input: InputTensor) -> YoloPostResult<RawTensor> {
        self(input)
    }
}

/// Runs normalization, inference, decoding and suppression for each frame.
pub struct Detector<E> {
    engine: E,
    labels: LabelSet,
    config: PipelineConfig,
}

impl<E: InferenceEngine> Detector<E> {
    /// Creates a detector with default configuration.
    pub fn new(engine: E, labels: LabelSet) -> Self {
        Self {
            engine,
            labels,
            config: PipelineConfig::default(),
        }
    }

    /// Replaces the configuration after validating it.
    pub fn with_config(mut self, config: PipelineConfig) -> YoloPostResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the session labels.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Returns the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Processes one frame end to end.
    pub fn process_frame(&mut self, frame: PixelFrame<'_>) -> YoloPostResult<Vec<Detection>> {
        let _span = trace_span!("process_frame", side = self.config.side).entered();
        let result = self.run(frame);
        if let Err(err) = &result {
            trace_warn!("frame dropped: {}", err);
        }
        result
    }

    fn run(&mut self, frame: PixelFrame<'_>) -> YoloPostResult<Vec<Detection>> {
        let input = normalize_with(frame, self.config.side, self.config.parallel)?;
        let raw = self.engine.infer(input)?;
        self.postprocess(raw.view())
    }

    /// Decodes and suppresses a raw output for this session.
    pub fn postprocess(&self, raw: RawOutput<'_>) -> YoloPostResult<Vec<Detection>> {
        postprocess(raw, &self.labels, &self.config)
    }
}

/// Decodes and suppresses a raw output with an explicit session context.
pub fn postprocess(
    raw: RawOutput<'_>,
    labels: &LabelSet,
    config: &PipelineConfig,
) -> YoloPostResult<Vec<Detection>> {
    config.validate()?;
    let candidates = decode(raw, labels.len(), config.side, config.confidence_threshold)?;
    let detections = suppress_with(
        &candidates,
        labels.len(),
        config.iou_threshold,
        config.parallel,
    )?;
    trace_event!(
        "postprocessed",
        candidates = candidates.len(),
        detections = detections.len()
    );
    Ok(detections)
}
