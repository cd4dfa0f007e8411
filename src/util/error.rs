//! Error types for yolov3-decode.

use thiserror::Error;

/// Result alias for decoding operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while decoding raw detector outputs.
///
/// Every variant is a deterministic data or configuration error; none of them
/// is transient. An empty detection list is never reported through this type.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    /// A raw tensor length does not match the declared output shape.
    #[error("shape mismatch for {tensor}: expected {expected} elements, got {got}")]
    ShapeMismatch {
        tensor: &'static str,
        expected: usize,
        got: usize,
    },
    /// A threshold parameter lies outside its valid range.
    #[error("invalid {name}: {value} (expected a value in (0, 1))")]
    InvalidThreshold { name: &'static str, value: f32 },
    /// A class index does not address an entry of the class catalog.
    #[error("class index {index} out of range for {len} classes")]
    ClassIndexOutOfRange { index: i64, len: usize },
    /// A box index does not address a box of the raw output.
    #[error("box index {index} out of range for {len} boxes")]
    BoxIndexOutOfRange { index: i64, len: usize },
    /// A batch index other than zero was found in a single-image output.
    #[error("batch index {index} out of range for a single-image output")]
    BatchIndexOutOfRange { index: i64 },
    /// A bound output name was not present in the engine outputs.
    #[error("missing output tensor {name:?}")]
    MissingTensor { name: String },
    /// A bound output carried the wrong element type.
    #[error("output tensor {name:?} must hold {expected} elements")]
    TensorType { name: String, expected: &'static str },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Loading or saving an image failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}
