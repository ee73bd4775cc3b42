use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use yolopost::io::load_frame;
use yolopost::{normalize, postprocess, Detection, LabelSet, PipelineConfig, RawTensor};

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "yolopost CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for each pipeline stage.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PipelineConfigJson {
    side: usize,
    confidence_threshold: f32,
    iou_threshold: f32,
    parallel: bool,
}

impl Default for PipelineConfigJson {
    fn default() -> Self {
        let cfg = PipelineConfig::default();
        Self {
            side: cfg.side,
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            parallel: cfg.parallel,
        }
    }
}

impl From<PipelineConfigJson> for PipelineConfig {
    fn from(value: PipelineConfigJson) -> Self {
        Self {
            side: value.side,
            confidence_threshold: value.confidence_threshold,
            iou_threshold: value.iou_threshold,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    labels_path: String,
    raw_output_path: Option<String>,
    image_path: Option<String>,
    tensor_output_path: Option<String>,
    output_path: Option<String>,
    pipeline: PipelineConfigJson,
}

/// Detector output as dumped by the inference side.
#[derive(Debug, Deserialize)]
struct RawOutputJson {
    shape: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    class_index: usize,
    label: Option<String>,
    score: f32,
    bbox: [f32; 4],
}

impl DetectionRecord {
    fn new(det: &Detection, labels: &LabelSet) -> Self {
        Self {
            class_index: det.class_index,
            label: det.label(labels).map(str::to_owned),
            score: det.score,
            bbox: [det.bbox.left, det.bbox.top, det.bbox.right, det.bbox.bottom],
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    side: usize,
    detections: Vec<DetectionRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("yolopost=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.labels_path.is_empty() {
        return Err("labels_path must be set in the config".into());
    }
    if config.raw_output_path.is_none() && config.image_path.is_none() {
        return Err("at least one of raw_output_path or image_path must be set".into());
    }
    if config.tensor_output_path.is_some() && config.image_path.is_none() {
        return Err("tensor_output_path requires image_path".into());
    }

    let labels = LabelSet::load(&config.labels_path)?;
    let pipeline: PipelineConfig = config.pipeline.into();
    pipeline.validate()?;
    info!(classes = labels.len(), side = pipeline.side, "session ready");

    if let Some(image_path) = &config.image_path {
        let frame = load_frame(image_path, pipeline.side)?;
        let tensor = normalize(frame.view(), pipeline.side)?;
        info!(shape = ?tensor.shape(), "normalized {image_path}");
        if let Some(tensor_path) = &config.tensor_output_path {
            let bytes: Vec<u8> = tensor
                .as_slice()
                .iter()
                .flat_map(|v| v.to_le_bytes())
                .collect();
            fs::write(tensor_path, bytes)?;
        }
    }

    let Some(raw_path) = &config.raw_output_path else {
        return Ok(());
    };
    let raw_text = fs::read_to_string(raw_path)?;
    let raw_json: RawOutputJson = serde_json::from_str(&raw_text)?;
    let raw = RawTensor::from_shape(raw_json.data, &raw_json.shape)?;
    let detections = postprocess(raw.view(), &labels, &pipeline)?;

    let output = Output {
        side: pipeline.side,
        detections: detections
            .iter()
            .map(|det| DetectionRecord::new(det, &labels))
            .collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
