//! Greedy IoU-based non-maximum suppression, run independently per class.

use std::collections::BTreeMap;

use crate::candidate::Candidate;
use crate::trace::{trace_event, trace_span};
use crate::util::math::check_half_open_unit;
use crate::util::DecodeResult;

/// Applies greedy NMS to each class separately.
///
/// Within a class, candidates are visited by descending score (stable, so
/// equal scores keep their input order); each kept box suppresses every later
/// box whose IoU with it is strictly greater than `iou_threshold`. Candidates
/// of different classes never suppress each other. The result lists classes in
/// ascending index order, each class in keep order.
///
/// `iou_threshold` must lie in `[0, 1)`; at 0 any positive overlap suppresses.
/// Candidates with a NaN score are dropped.
pub fn nms_per_class(candidates: &[Candidate], iou_threshold: f32) -> DecodeResult<Vec<Candidate>> {
    let iou_threshold = check_half_open_unit("iou_threshold", iou_threshold)?;
    let _span = trace_span!("nms", candidates = candidates.len()).entered();

    let mut kept = Vec::new();
    for group in group_by_class(candidates).into_values() {
        kept.extend(suppress_class(group, iou_threshold));
    }

    trace_event!("nms_kept", count = kept.len());
    Ok(kept)
}

/// Same as [`nms_per_class`], with classes processed on the rayon pool.
///
/// The output is identical to the sequential version, order included.
#[cfg(feature = "rayon")]
pub fn nms_per_class_par(
    candidates: &[Candidate],
    iou_threshold: f32,
) -> DecodeResult<Vec<Candidate>> {
    use rayon::prelude::*;

    let iou_threshold = check_half_open_unit("iou_threshold", iou_threshold)?;
    let _span = trace_span!("nms_par", candidates = candidates.len()).entered();

    let groups: Vec<Vec<Candidate>> = group_by_class(candidates).into_values().collect();
    let per_class: Vec<Vec<Candidate>> = groups
        .into_par_iter()
        .map(|group| suppress_class(group, iou_threshold))
        .collect();
    let kept: Vec<Candidate> = per_class.into_iter().flatten().collect();

    trace_event!("nms_kept", count = kept.len());
    Ok(kept)
}

fn group_by_class(candidates: &[Candidate]) -> BTreeMap<usize, Vec<Candidate>> {
    let mut groups: BTreeMap<usize, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates.iter().filter(|c| !c.score.is_nan()) {
        groups
            .entry(candidate.class_index)
            .or_default()
            .push(*candidate);
    }
    groups
}

fn suppress_class(mut group: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    // `sort_by` is stable: ties stay in input order.
    group.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut suppressed = vec![false; group.len()];
    let mut kept = Vec::new();
    for i in 0..group.len() {
        if suppressed[i] {
            continue;
        }
        let keep = group[i];
        kept.push(keep);
        for j in (i + 1)..group.len() {
            if !suppressed[j] && keep.bbox.iou(&group[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::nms_per_class;
    use crate::candidate::Candidate;
    use crate::geometry::BoundingBox;
    use crate::util::DecodeError;

    fn cand(x: f32, class_index: usize, score: f32) -> Candidate {
        Candidate::new(BoundingBox::new(x, x, x + 10.0, x + 10.0), class_index, score)
    }

    #[test]
    fn overlapping_lower_score_is_suppressed() {
        let kept = nms_per_class(&[cand(1.0, 0, 0.8), cand(0.0, 0, 0.9)], 0.5).unwrap();
        assert_eq!(kept, vec![cand(0.0, 0, 0.9)]);
    }

    #[test]
    fn suppression_chain_is_greedy() {
        // b overlaps a and c; c does not overlap a. Once a suppresses b, c survives.
        let a = Candidate::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0, 0.9);
        let b = Candidate::new(BoundingBox::new(3.0, 0.0, 13.0, 10.0), 0, 0.8);
        let c = Candidate::new(BoundingBox::new(9.0, 0.0, 19.0, 10.0), 0, 0.7);
        let kept = nms_per_class(&[c, b, a], 0.3).unwrap();
        assert_eq!(kept, vec![a, c]);
    }

    #[test]
    fn iou_equal_to_threshold_is_kept() {
        // IoU of these two boxes is exactly 0.5.
        let a = Candidate::new(BoundingBox::new(0.0, 0.0, 4.0, 1.0), 0, 0.9);
        let b = Candidate::new(BoundingBox::new(0.0, 0.0, 2.0, 1.0), 0, 0.8);
        let kept = nms_per_class(&[a, b], 0.5).unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn classes_come_out_in_ascending_order() {
        let kept = nms_per_class(
            &[cand(0.0, 3, 0.5), cand(40.0, 1, 0.6), cand(80.0, 3, 0.9)],
            0.5,
        )
        .unwrap();
        let classes: Vec<_> = kept.iter().map(|c| c.class_index).collect();
        assert_eq!(classes, vec![1, 3, 3]);
        assert_eq!(kept[1].score, 0.9);
    }

    #[test]
    fn nan_scores_are_dropped() {
        let kept = nms_per_class(&[cand(0.0, 0, f32::NAN), cand(0.0, 0, 0.4)], 0.5).unwrap();
        assert_eq!(kept, vec![cand(0.0, 0, 0.4)]);
    }

    #[test]
    fn rejects_threshold_of_one() {
        let err = nms_per_class(&[], 1.0).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidThreshold {
                name: "iou_threshold",
                value: 1.0,
            }
        );
    }
}
