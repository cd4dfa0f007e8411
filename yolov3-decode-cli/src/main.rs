use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use yolov3_decode::render::io::{load_font, load_rgb_image, save_rgb_image};
use yolov3_decode::render::{draw_detections, DrawStyle};
use yolov3_decode::{
    decode, sort_by_confidence, BoundingBox, BoxOrder, ClassCatalog, DecodeConfig, Detection,
    Letterbox, NamedTensors, OutputBindings, OutputShape, ScoreLayout, TensorData, TensorLayout,
    YOLOV3_BOX_COUNT,
};

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "YOLOv3 output decoder (JSON config driven)")]
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
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

/// Which export produced the raw dump; selects output names and layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModelConfig {
    /// Model-zoo export with internal NMS.
    OnnxNms,
    /// Document-layout export emitting `bboxes` and `classes` only.
    RawHead,
}

impl ModelConfig {
    fn bindings(&self) -> OutputBindings {
        match self {
            ModelConfig::OnnxNms => OutputBindings::yolov3_onnx_nms(),
            ModelConfig::RawHead => OutputBindings::bboxes_classes(),
        }
    }

    fn layout(&self) -> TensorLayout {
        match self {
            ModelConfig::OnnxNms => TensorLayout::yolov3_onnx_nms(),
            ModelConfig::RawHead => TensorLayout::xyxy_class_major(),
        }
    }

    fn catalog(&self) -> ClassCatalog {
        match self {
            ModelConfig::OnnxNms => ClassCatalog::coco(),
            ModelConfig::RawHead => ClassCatalog::document_layout(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BoxOrderConfig {
    Xyxy,
    Yxyx,
}

impl From<BoxOrderConfig> for BoxOrder {
    fn from(value: BoxOrderConfig) -> Self {
        match value {
            BoxOrderConfig::Xyxy => BoxOrder::XyXy,
            BoxOrderConfig::Yxyx => BoxOrder::YxYx,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScoreLayoutConfig {
    ClassMajor,
    BoxMajor,
}

impl From<ScoreLayoutConfig> for ScoreLayout {
    fn from(value: ScoreLayoutConfig) -> Self {
        match value {
            ScoreLayoutConfig::ClassMajor => ScoreLayout::ClassMajor,
            ScoreLayoutConfig::BoxMajor => ScoreLayout::BoxMajor,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeConfigJson {
    confidence_threshold: f32,
    iou_threshold: f32,
    box_order: Option<BoxOrderConfig>,
    score_layout: Option<ScoreLayoutConfig>,
    parallel: bool,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            box_order: None,
            score_layout: None,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    raw_output_path: String,
    model: ModelConfig,
    num_boxes: usize,
    labels_path: Option<String>,
    image_path: Option<String>,
    output_image_path: Option<String>,
    font_path: Option<String>,
    network_input_size: Option<u32>,
    sort_by_confidence: bool,
    output_path: Option<String>,
    decode: DecodeConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_output_path: String::new(),
            model: ModelConfig::RawHead,
            num_boxes: YOLOV3_BOX_COUNT,
            labels_path: None,
            image_path: None,
            output_image_path: None,
            font_path: None,
            network_input_size: None,
            sort_by_confidence: false,
            output_path: None,
            decode: DecodeConfigJson::default(),
        }
    }
}

/// One tensor of the raw dump. Integer-only arrays parse as `Ints`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TensorJson {
    Ints(Vec<i64>),
    Floats(Vec<f32>),
}

impl TensorJson {
    fn into_f32(self) -> Vec<f32> {
        match self {
            TensorJson::Ints(values) => values.into_iter().map(|v| v as f32).collect(),
            TensorJson::Floats(values) => values,
        }
    }

    fn into_i64(self) -> Result<Vec<i64>, String> {
        match self {
            TensorJson::Ints(values) => Ok(values),
            TensorJson::Floats(values) => values
                .into_iter()
                .map(|v| {
                    if v.fract() == 0.0 {
                        Ok(v as i64)
                    } else {
                        Err(format!("index tensor holds non-integer value {v}"))
                    }
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BoxRecord {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl From<BoundingBox> for BoxRecord {
    fn from(value: BoundingBox) -> Self {
        Self {
            x1: value.x1,
            y1: value.y1,
            x2: value.x2,
            y2: value.y2,
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    label: String,
    class_index: usize,
    confidence: f32,
    bbox: BoxRecord,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        Self {
            label: value.label,
            class_index: value.class_index,
            confidence: value.confidence,
            bbox: value.bbox.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    count: usize,
    detections: Vec<DetectionRecord>,
}

fn load_tensors(
    path: &str,
    bindings: &OutputBindings,
) -> Result<NamedTensors, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let dump: HashMap<String, TensorJson> = serde_json::from_str(&text)?;
    let mut tensors = NamedTensors::new();
    for (name, tensor) in dump {
        let data = if bindings.indices.as_deref() == Some(name.as_str()) {
            TensorData::I64(tensor.into_i64()?)
        } else {
            TensorData::F32(tensor.into_f32())
        };
        tensors.insert(name, data);
    }
    Ok(tensors)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("yolov3_decode=debug".parse()?),
            )
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
    if config.raw_output_path.is_empty() {
        return Err("raw_output_path must be set in the config".into());
    }
    if config.network_input_size.is_some() && config.image_path.is_none() {
        return Err("network_input_size needs image_path to recover the source size".into());
    }

    let catalog = match &config.labels_path {
        Some(path) => ClassCatalog::from_lines(&fs::read_to_string(path)?)?,
        None => config.model.catalog(),
    };

    let bindings = config.model.bindings();
    let tensors = load_tensors(&config.raw_output_path, &bindings)?;
    let shape = OutputShape::new(config.num_boxes, catalog.len());
    let raw = bindings.resolve(tensors, shape)?;
    info!(
        boxes = raw.num_boxes(),
        classes = raw.num_classes(),
        indexed = raw.indices().is_some(),
        "loaded raw output"
    );

    let mut layout = config.model.layout();
    if let Some(order) = config.decode.box_order {
        layout.box_order = order.into();
    }
    if let Some(scores) = config.decode.score_layout {
        layout.score_layout = scores.into();
    }
    let decode_cfg = DecodeConfig {
        confidence_threshold: config.decode.confidence_threshold,
        iou_threshold: config.decode.iou_threshold,
        layout,
        parallel: config.decode.parallel,
    };
    let mut detections = decode(&raw, &catalog, &decode_cfg)?;
    if config.sort_by_confidence {
        sort_by_confidence(&mut detections);
    }
    info!(count = detections.len(), "decoded detections");

    if let Some(image_path) = &config.image_path {
        let mut image = load_rgb_image(image_path)?;
        if let Some(size) = config.network_input_size {
            let letterbox = Letterbox::fit(image.width(), image.height(), size, size)?;
            for det in &mut detections {
                det.bbox = letterbox.to_source(&det.bbox);
            }
        }
        if let Some(out_path) = &config.output_image_path {
            let font = config.font_path.as_ref().map(load_font).transpose()?;
            draw_detections(&mut image, &detections, &DrawStyle::default(), font.as_ref());
            save_rgb_image(&image, out_path)?;
            info!(path = %out_path, "wrote annotated image");
        }
    }

    let output = Output {
        count: detections.len(),
        detections: detections.into_iter().map(DetectionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
