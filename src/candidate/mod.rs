//! Candidate extraction and pruning for the pre-NMS decoding path.
//!
//! Extraction expands raw tensors into per-class scored boxes above a
//! confidence floor; suppression removes same-class duplicates greedily.

pub(crate) mod extract;
pub(crate) mod nms;

use crate::geometry::BoundingBox;

/// A scored box for one class, considered for suppression.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Box corners, already interpreted through the model's box order.
    pub bbox: BoundingBox,
    /// Class index into the catalog.
    pub class_index: usize,
    /// Class confidence.
    pub score: f32,
}

impl Candidate {
    /// Creates a candidate.
    pub fn new(bbox: BoundingBox, class_index: usize, score: f32) -> Self {
        Self {
            bbox,
            class_index,
            score,
        }
    }
}
