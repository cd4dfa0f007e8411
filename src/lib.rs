//! Decoding of raw YOLOv3 detector outputs into labeled boxes.
//!
//! The inference engine is treated as an opaque step that yields box and
//! score tensors, plus an NMS index list for exports that suppress inside the
//! graph. This crate validates those tensors, applies confidence thresholding
//! and per-class non-maximum suppression where needed, and assembles
//! `Detection` records. Per-class suppression can run on rayon via the
//! `rayon` feature; drawing helpers live behind `image-io`.

pub mod assemble;
mod candidate;
pub mod catalog;
pub mod decode;
pub mod geometry;
pub mod letterbox;
pub mod lowlevel;
pub mod output;
#[cfg(feature = "image-io")]
pub mod render;
mod trace;
pub mod util;

pub use assemble::{sort_by_confidence, Detection};
pub use catalog::{ClassCatalog, COCO_CLASSES};
pub use decode::{decode, AutoDecoder, DecodeConfig, Decoder, PostNmsDecoder, PreNmsDecoder};
pub use geometry::{iou, BoundingBox, BoxOrder};
pub use letterbox::Letterbox;
pub use output::bindings::{NamedTensors, OutputBindings, TensorData};
pub use output::{
    yolov3_box_count, IndexTriple, OutputShape, RawDetectionOutput, ScoreLayout, TensorLayout,
    YOLOV3_BOX_COUNT, YOLOV3_INPUT_SIZE,
};
pub use util::{DecodeError, DecodeResult};
