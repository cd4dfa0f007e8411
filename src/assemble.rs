//! Turning kept candidates or engine index lists into labeled detections.
//!
//! Boxes stay in the coordinate space of the raw output. Mapping them back to
//! the source image (undoing the letterbox) is left to the caller; see
//! [`crate::letterbox`].

use crate::candidate::Candidate;
use crate::catalog::ClassCatalog;
use crate::geometry::BoundingBox;
use crate::output::{RawDetectionOutput, TensorLayout};
use crate::util::math::index_in;
use crate::util::{DecodeError, DecodeResult};

/// A labeled, scored box.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Box corners in the raw output's coordinate space.
    pub bbox: BoundingBox,
    /// Class index into the catalog.
    pub class_index: usize,
    /// Class name.
    pub label: String,
    /// Class confidence, passed through from the engine unvalidated.
    pub confidence: f32,
}

/// Checks that the catalog names exactly the classes the output scores.
pub fn check_catalog(output: &RawDetectionOutput, catalog: &ClassCatalog) -> DecodeResult<()> {
    if catalog.len() != output.num_classes() {
        return Err(DecodeError::ShapeMismatch {
            tensor: "class catalog",
            expected: output.num_classes(),
            got: catalog.len(),
        });
    }
    Ok(())
}

/// Labels candidates that survived suppression, preserving their order.
pub fn assemble_candidates(
    kept: &[Candidate],
    catalog: &ClassCatalog,
) -> DecodeResult<Vec<Detection>> {
    kept.iter()
        .map(|candidate| {
            let label = catalog.get(candidate.class_index).ok_or(
                DecodeError::ClassIndexOutOfRange {
                    index: candidate.class_index as i64,
                    len: catalog.len(),
                },
            )?;
            Ok(Detection {
                bbox: candidate.bbox,
                class_index: candidate.class_index,
                label: label.to_owned(),
                confidence: candidate.score,
            })
        })
        .collect()
}

/// Gathers one detection per engine index triple, in engine order.
///
/// Every triple is bounds-checked before any buffer is read: batch must be 0,
/// the class must address the catalog and the score tensor, and the box must
/// address the box tensor. An output without indices yields no detections.
pub fn gather_indexed(
    output: &RawDetectionOutput,
    layout: TensorLayout,
    catalog: &ClassCatalog,
) -> DecodeResult<Vec<Detection>> {
    let Some(indices) = output.indices() else {
        return Ok(Vec::new());
    };
    let class_len = catalog.len().min(output.num_classes());

    let mut detections = Vec::with_capacity(indices.len());
    for triple in indices {
        if triple.batch != 0 {
            return Err(DecodeError::BatchIndexOutOfRange {
                index: triple.batch,
            });
        }
        let class_index =
            index_in(triple.class, class_len).ok_or(DecodeError::ClassIndexOutOfRange {
                index: triple.class,
                len: class_len,
            })?;
        let box_index = index_in(triple.box_index, output.num_boxes()).ok_or(
            DecodeError::BoxIndexOutOfRange {
                index: triple.box_index,
                len: output.num_boxes(),
            },
        )?;

        let label = catalog.label(triple.class)?;
        let bbox = output.bounding_box(box_index, layout.box_order).ok_or(
            DecodeError::BoxIndexOutOfRange {
                index: triple.box_index,
                len: output.num_boxes(),
            },
        )?;
        let confidence = output
            .score(layout.score_layout, class_index, box_index)
            .ok_or(DecodeError::BoxIndexOutOfRange {
                index: triple.box_index,
                len: output.num_boxes(),
            })?;

        detections.push(Detection {
            bbox,
            class_index,
            label: label.to_owned(),
            confidence,
        });
    }
    Ok(detections)
}

/// Sorts detections by descending confidence for presentation.
///
/// The sort is stable, so equal confidences keep their decode order.
pub fn sort_by_confidence(detections: &mut [Detection]) {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}
