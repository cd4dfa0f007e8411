//! Routing from model output names to logical tensors.
//!
//! Each export names its outputs differently. `OutputBindings` is resolved
//! once when the inference engine is wired up and turns whatever the engine
//! returned, keyed by output name, into a `RawDetectionOutput`.

use std::collections::HashMap;

use crate::output::{IndexTriple, OutputShape, RawDetectionOutput};
use crate::util::{DecodeError, DecodeResult};

/// Element buffer of one engine output.
#[derive(Clone, Debug, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    I32(Vec<i32>),
    I64(Vec<i64>),
}

/// Engine outputs keyed by model output name.
#[derive(Clone, Debug, Default)]
pub struct NamedTensors {
    tensors: HashMap<String, TensorData>,
}

impl NamedTensors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an output.
    pub fn insert(&mut self, name: impl Into<String>, data: TensorData) {
        self.tensors.insert(name.into(), data);
    }

    /// Builder-style variant of [`NamedTensors::insert`].
    pub fn with(mut self, name: impl Into<String>, data: TensorData) -> Self {
        self.insert(name, data);
        self
    }

    /// Returns the number of outputs held.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Returns `true` when no outputs are held.
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    fn take(&mut self, name: &str) -> DecodeResult<TensorData> {
        self.tensors
            .remove(name)
            .ok_or_else(|| DecodeError::MissingTensor {
                name: name.to_owned(),
            })
    }
}

/// Model output names for the `boxes`, `scores` and `indices` tensors.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct OutputBindings {
    /// Output holding the `N x 4` boxes.
    pub boxes: String,
    /// Output holding the `C x N` scores.
    pub scores: String,
    /// Output holding the `K x 3` NMS index list, for exports that have one.
    pub indices: Option<String>,
}

impl OutputBindings {
    /// Output names of the ONNX model-zoo `yolov3-10` export.
    pub fn yolov3_onnx_nms() -> Self {
        Self {
            boxes: "yolonms_layer_1/ExpandDims_1:0".to_owned(),
            scores: "yolonms_layer_1/ExpandDims_3:0".to_owned(),
            indices: Some("yolonms_layer_1/concat_2:0".to_owned()),
        }
    }

    /// Output names of a raw-head export without NMS (`bboxes`, `classes`).
    pub fn bboxes_classes() -> Self {
        Self {
            boxes: "bboxes".to_owned(),
            scores: "classes".to_owned(),
            indices: None,
        }
    }

    /// Output names to request from the engine, in binding order.
    pub fn output_names(&self) -> Vec<&str> {
        let mut names = vec![self.boxes.as_str(), self.scores.as_str()];
        if let Some(indices) = &self.indices {
            names.push(indices.as_str());
        }
        names
    }

    /// Pulls the bound outputs out of `tensors` and checks them against `shape`.
    ///
    /// Unbound outputs are ignored.
    pub fn resolve(
        &self,
        mut tensors: NamedTensors,
        shape: OutputShape,
    ) -> DecodeResult<RawDetectionOutput> {
        let boxes = expect_f32(&self.boxes, tensors.take(&self.boxes)?)?;
        let scores = expect_f32(&self.scores, tensors.take(&self.scores)?)?;
        let output = RawDetectionOutput::new(shape, boxes, scores)?;

        let Some(name) = &self.indices else {
            return Ok(output);
        };
        let triples = match tensors.take(name)? {
            TensorData::I32(flat) => IndexTriple::from_flat_i32(&flat)?,
            TensorData::I64(flat) => IndexTriple::from_flat(&flat)?,
            TensorData::F32(_) => {
                return Err(DecodeError::TensorType {
                    name: name.clone(),
                    expected: "integer",
                })
            }
        };
        Ok(output.with_indices(triples))
    }
}

fn expect_f32(name: &str, data: TensorData) -> DecodeResult<Vec<f32>> {
    match data {
        TensorData::F32(values) => Ok(values),
        _ => Err(DecodeError::TensorType {
            name: name.to_owned(),
            expected: "f32",
        }),
    }
}
