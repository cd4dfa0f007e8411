//! Raw inference outputs and their memory layout.
//!
//! A `RawDetectionOutput` is an immutable snapshot of one inference call:
//! `N` boxes of four floats each, `C x N` class scores, and for exports with
//! an internal NMS op, a list of `(batch, class, box)` index triples. The
//! buffer lengths are checked once at construction; index bounds are checked
//! by the assembler that consumes them.

use crate::geometry::{BoundingBox, BoxOrder};
use crate::util::{DecodeError, DecodeResult};

pub mod bindings;

/// Network input side length used by the reference YOLOv3 exports.
pub const YOLOV3_INPUT_SIZE: usize = 416;

/// Box proposals emitted for a 416x416 input: `(52^2 + 26^2 + 13^2) * 3`.
pub const YOLOV3_BOX_COUNT: usize = 10_647;

const YOLOV3_STRIDES: [usize; 3] = [8, 16, 32];
const YOLOV3_ANCHORS_PER_CELL: usize = 3;

/// Number of box proposals YOLOv3 emits for a square input of `input_size`.
pub fn yolov3_box_count(input_size: usize) -> usize {
    YOLOV3_STRIDES
        .iter()
        .map(|stride| {
            let cells = input_size / stride;
            cells * cells * YOLOV3_ANCHORS_PER_CELL
        })
        .sum()
}

/// Flattening order of the score tensor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ScoreLayout {
    /// `scores[class * N + box]`: one contiguous block per class.
    #[default]
    ClassMajor,
    /// `scores[box * C + class]`: one contiguous row per box.
    BoxMajor,
}

impl ScoreLayout {
    /// Flat offset of the score for `(class, box_index)`.
    #[inline]
    pub fn offset(self, shape: OutputShape, class: usize, box_index: usize) -> usize {
        match self {
            ScoreLayout::ClassMajor => class * shape.num_boxes + box_index,
            ScoreLayout::BoxMajor => box_index * shape.num_classes + class,
        }
    }
}

/// How a particular model export lays out its box and score tensors.
///
/// Different exports of the same network disagree on both axes, so the
/// layout travels with the decoder instead of being assumed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct TensorLayout {
    /// Coordinate order of each raw box.
    pub box_order: BoxOrder,
    /// Flattening order of the score tensor.
    pub score_layout: ScoreLayout,
}

impl TensorLayout {
    /// Layout of the ONNX model-zoo export with a built-in NMS op
    /// (`y1, x1, y2, x2` boxes, class-major scores).
    pub fn yolov3_onnx_nms() -> Self {
        Self {
            box_order: BoxOrder::YxYx,
            score_layout: ScoreLayout::ClassMajor,
        }
    }

    /// `x1, y1, x2, y2` boxes with class-major scores.
    pub fn xyxy_class_major() -> Self {
        Self {
            box_order: BoxOrder::XyXy,
            score_layout: ScoreLayout::ClassMajor,
        }
    }
}

/// Declared dimensions of a raw output.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct OutputShape {
    /// Number of box proposals `N`.
    pub num_boxes: usize,
    /// Number of classes `C`.
    pub num_classes: usize,
}

impl OutputShape {
    /// Creates a shape with explicit dimensions.
    pub fn new(num_boxes: usize, num_classes: usize) -> Self {
        Self {
            num_boxes,
            num_classes,
        }
    }

    /// Shape of a 416x416 YOLOv3 output with `num_classes` classes.
    pub fn yolov3(num_classes: usize) -> Self {
        Self::new(YOLOV3_BOX_COUNT, num_classes)
    }

    fn boxes_len(&self) -> DecodeResult<usize> {
        self.num_boxes
            .checked_mul(4)
            .ok_or(DecodeError::InvalidInput("box count overflows"))
    }

    fn scores_len(&self) -> DecodeResult<usize> {
        self.num_boxes
            .checked_mul(self.num_classes)
            .ok_or(DecodeError::InvalidInput("score count overflows"))
    }
}

/// One surviving detection reported by an engine-internal NMS op.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct IndexTriple {
    /// Image index within the batch; always 0 for single-image inference.
    pub batch: i64,
    /// Class index into the catalog.
    pub class: i64,
    /// Box index into the box tensor.
    pub box_index: i64,
}

impl IndexTriple {
    /// Creates a triple.
    pub fn new(batch: i64, class: i64, box_index: i64) -> Self {
        Self {
            batch,
            class,
            box_index,
        }
    }

    /// Splits a flat `K x 3` index buffer into triples.
    pub fn from_flat(flat: &[i64]) -> DecodeResult<Vec<IndexTriple>> {
        if flat.len() % 3 != 0 {
            return Err(DecodeError::ShapeMismatch {
                tensor: "indices",
                expected: flat.len() - flat.len() % 3,
                got: flat.len(),
            });
        }
        Ok(flat
            .chunks_exact(3)
            .map(|t| IndexTriple::new(t[0], t[1], t[2]))
            .collect())
    }

    /// Same as [`IndexTriple::from_flat`] for engines emitting `int32` indices.
    pub fn from_flat_i32(flat: &[i32]) -> DecodeResult<Vec<IndexTriple>> {
        let widened: Vec<i64> = flat.iter().map(|&v| i64::from(v)).collect();
        Self::from_flat(&widened)
    }
}

/// Immutable snapshot of the raw tensors from one inference call.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDetectionOutput {
    shape: OutputShape,
    boxes: Vec<f32>,
    scores: Vec<f32>,
    indices: Option<Vec<IndexTriple>>,
}

impl RawDetectionOutput {
    /// Wraps raw box and score buffers, checking their lengths against `shape`.
    pub fn new(shape: OutputShape, boxes: Vec<f32>, scores: Vec<f32>) -> DecodeResult<Self> {
        let boxes_len = shape.boxes_len()?;
        if boxes.len() != boxes_len {
            return Err(DecodeError::ShapeMismatch {
                tensor: "boxes",
                expected: boxes_len,
                got: boxes.len(),
            });
        }
        let scores_len = shape.scores_len()?;
        if scores.len() != scores_len {
            return Err(DecodeError::ShapeMismatch {
                tensor: "scores",
                expected: scores_len,
                got: scores.len(),
            });
        }
        Ok(Self {
            shape,
            boxes,
            scores,
            indices: None,
        })
    }

    /// Attaches the index list produced by an engine-internal NMS op.
    pub fn with_indices(mut self, indices: Vec<IndexTriple>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Returns the declared dimensions.
    pub fn shape(&self) -> OutputShape {
        self.shape
    }

    /// Returns the number of box proposals `N`.
    pub fn num_boxes(&self) -> usize {
        self.shape.num_boxes
    }

    /// Returns the number of classes `C`.
    pub fn num_classes(&self) -> usize {
        self.shape.num_classes
    }

    /// Returns the flat `N x 4` box buffer.
    pub fn boxes(&self) -> &[f32] {
        &self.boxes
    }

    /// Returns the flat `C x N` score buffer.
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Returns the engine's index list, if the export has one.
    pub fn indices(&self) -> Option<&[IndexTriple]> {
        self.indices.as_deref()
    }

    /// Returns the four raw floats of box `n`.
    pub fn raw_box(&self, n: usize) -> Option<[f32; 4]> {
        if n >= self.shape.num_boxes {
            return None;
        }
        let start = n * 4;
        let raw = self.boxes.get(start..start + 4)?;
        Some([raw[0], raw[1], raw[2], raw[3]])
    }

    /// Returns box `n` with its corners named according to `order`.
    pub fn bounding_box(&self, n: usize, order: BoxOrder) -> Option<BoundingBox> {
        self.raw_box(n).map(|raw| BoundingBox::from_raw(raw, order))
    }

    /// Returns the score of `class` for box `n`.
    pub fn score(&self, layout: ScoreLayout, class: usize, n: usize) -> Option<f32> {
        if class >= self.shape.num_classes || n >= self.shape.num_boxes {
            return None;
        }
        self.scores.get(layout.offset(self.shape, class, n)).copied()
    }
}
