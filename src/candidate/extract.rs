//! Confidence thresholding over raw box and score tensors.

use crate::candidate::Candidate;
use crate::output::{RawDetectionOutput, ScoreLayout, TensorLayout};
use crate::trace::{trace_event, trace_span};
use crate::util::math::check_open_unit;
use crate::util::DecodeResult;

/// Emits every `(box, class)` pair whose score is strictly above
/// `confidence_threshold`.
///
/// Candidates come out class by class, boxes ascending within a class,
/// whatever the score layout. A score equal to the threshold is dropped and
/// NaN scores never pass.
pub fn extract_candidates(
    output: &RawDetectionOutput,
    layout: TensorLayout,
    confidence_threshold: f32,
) -> DecodeResult<Vec<Candidate>> {
    let threshold = check_open_unit("confidence_threshold", confidence_threshold)?;
    let shape = output.shape();
    let _span = trace_span!(
        "extract_candidates",
        boxes = shape.num_boxes,
        classes = shape.num_classes
    )
    .entered();

    let scores = output.scores();
    let mut candidates = Vec::new();
    for class_index in 0..shape.num_classes {
        let mut push = |n: usize, score: f32| {
            if score > threshold {
                if let Some(bbox) = output.bounding_box(n, layout.box_order) {
                    candidates.push(Candidate::new(bbox, class_index, score));
                }
            }
        };
        match layout.score_layout {
            ScoreLayout::ClassMajor => {
                let start = class_index * shape.num_boxes;
                let block = &scores[start..start + shape.num_boxes];
                for (n, &score) in block.iter().enumerate() {
                    push(n, score);
                }
            }
            ScoreLayout::BoxMajor => {
                for n in 0..shape.num_boxes {
                    push(n, scores[layout.score_layout.offset(shape, class_index, n)]);
                }
            }
        }
    }

    trace_event!("candidates", count = candidates.len());
    Ok(candidates)
}
