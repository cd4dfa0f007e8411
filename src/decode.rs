//! Decoders from raw outputs to labeled detections.
//!
//! Two model exports exist. One emits raw boxes and scores and leaves
//! thresholding and suppression to us ([`PreNmsDecoder`]); the other runs NMS
//! inside the graph and adds an index list ([`PostNmsDecoder`]).
//! [`AutoDecoder`] picks between them by whether the output carries indices.

use crate::assemble::{assemble_candidates, check_catalog, gather_indexed, Detection};
use crate::candidate::extract::extract_candidates;
use crate::catalog::ClassCatalog;
use crate::output::{RawDetectionOutput, TensorLayout};
use crate::trace::{trace_event, trace_span};
use crate::util::math::check_open_unit;
use crate::util::{DecodeError, DecodeResult};

/// Decoding parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Minimum class score (exclusive) for a box to become a candidate.
    pub confidence_threshold: f32,
    /// IoU above which a lower-scored same-class box is suppressed.
    pub iou_threshold: f32,
    /// Box order and score flattening of the model export.
    pub layout: TensorLayout,
    /// Run per-class suppression on the rayon pool (needs the `rayon` feature).
    pub parallel: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.2,
            iou_threshold: 0.5,
            layout: TensorLayout::default(),
            parallel: false,
        }
    }
}

impl DecodeConfig {
    /// Checks both thresholds lie in (0, 1).
    pub fn validate(&self) -> DecodeResult<()> {
        check_open_unit("confidence_threshold", self.confidence_threshold)?;
        check_open_unit("iou_threshold", self.iou_threshold)?;
        Ok(())
    }
}

/// Turns one inference call's raw output into detections.
pub trait Decoder {
    /// Decodes `output`, labeling classes through `catalog`.
    ///
    /// An empty list means nothing was detected; it is not an error.
    fn decode(
        &self,
        output: &RawDetectionOutput,
        catalog: &ClassCatalog,
    ) -> DecodeResult<Vec<Detection>>;
}

/// Thresholding plus per-class NMS over raw boxes and scores.
#[derive(Clone, Debug, Default)]
pub struct PreNmsDecoder {
    cfg: DecodeConfig,
}

impl PreNmsDecoder {
    /// Creates a decoder with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the decoding parameters.
    pub fn with_config(mut self, cfg: DecodeConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the decoding parameters.
    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }
}

impl Decoder for PreNmsDecoder {
    fn decode(
        &self,
        output: &RawDetectionOutput,
        catalog: &ClassCatalog,
    ) -> DecodeResult<Vec<Detection>> {
        self.cfg.validate()?;
        check_catalog(output, catalog)?;
        let _span = trace_span!("decode_pre_nms", boxes = output.num_boxes()).entered();

        let candidates =
            extract_candidates(output, self.cfg.layout, self.cfg.confidence_threshold)?;
        let kept = suppress(&candidates, &self.cfg)?;
        let detections = assemble_candidates(&kept, catalog)?;

        trace_event!("detections", count = detections.len());
        Ok(detections)
    }
}

#[cfg(feature = "rayon")]
fn suppress(
    candidates: &[crate::candidate::Candidate],
    cfg: &DecodeConfig,
) -> DecodeResult<Vec<crate::candidate::Candidate>> {
    if cfg.parallel {
        crate::candidate::nms::nms_per_class_par(candidates, cfg.iou_threshold)
    } else {
        crate::candidate::nms::nms_per_class(candidates, cfg.iou_threshold)
    }
}

#[cfg(not(feature = "rayon"))]
fn suppress(
    candidates: &[crate::candidate::Candidate],
    cfg: &DecodeConfig,
) -> DecodeResult<Vec<crate::candidate::Candidate>> {
    crate::candidate::nms::nms_per_class(candidates, cfg.iou_threshold)
}

/// Gathers detections from the index list of an export with built-in NMS.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostNmsDecoder {
    layout: TensorLayout,
}

impl PostNmsDecoder {
    /// Creates a decoder for the given tensor layout.
    pub fn new(layout: TensorLayout) -> Self {
        Self { layout }
    }

    /// Returns the tensor layout.
    pub fn layout(&self) -> TensorLayout {
        self.layout
    }
}

impl Decoder for PostNmsDecoder {
    fn decode(
        &self,
        output: &RawDetectionOutput,
        catalog: &ClassCatalog,
    ) -> DecodeResult<Vec<Detection>> {
        if output.indices().is_none() {
            return Err(DecodeError::InvalidInput(
                "output carries no NMS index list",
            ));
        }
        check_catalog(output, catalog)?;
        let _span = trace_span!("decode_post_nms", boxes = output.num_boxes()).entered();

        let detections = gather_indexed(output, self.layout, catalog)?;

        trace_event!("detections", count = detections.len());
        Ok(detections)
    }
}

/// Uses [`PostNmsDecoder`] when the output has indices, [`PreNmsDecoder`] otherwise.
#[derive(Clone, Debug, Default)]
pub struct AutoDecoder {
    pre: PreNmsDecoder,
}

impl AutoDecoder {
    /// Creates a decoder with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the decoding parameters; only the layout applies to indexed outputs.
    pub fn with_config(mut self, cfg: DecodeConfig) -> Self {
        self.pre = self.pre.with_config(cfg);
        self
    }
}

impl Decoder for AutoDecoder {
    fn decode(
        &self,
        output: &RawDetectionOutput,
        catalog: &ClassCatalog,
    ) -> DecodeResult<Vec<Detection>> {
        if output.indices().is_some() {
            PostNmsDecoder::new(self.pre.config().layout).decode(output, catalog)
        } else {
            self.pre.decode(output, catalog)
        }
    }
}

/// Decodes with an [`AutoDecoder`] configured by `cfg`.
pub fn decode(
    output: &RawDetectionOutput,
    catalog: &ClassCatalog,
    cfg: &DecodeConfig,
) -> DecodeResult<Vec<Detection>> {
    AutoDecoder::new().with_config(cfg.clone()).decode(output, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{IndexTriple, OutputShape};

    #[test]
    fn config_validation_names_the_threshold() {
        let cfg = DecodeConfig {
            iou_threshold: 0.0,
            ..DecodeConfig::default()
        };
        assert_eq!(
            cfg.validate().unwrap_err(),
            DecodeError::InvalidThreshold {
                name: "iou_threshold",
                value: 0.0,
            }
        );
    }

    #[test]
    fn post_nms_requires_indices() {
        let out = RawDetectionOutput::new(OutputShape::new(1, 1), vec![0.0; 4], vec![0.5]).unwrap();
        let catalog = ClassCatalog::new(["x"]);
        assert!(matches!(
            PostNmsDecoder::default().decode(&out, &catalog),
            Err(DecodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn catalog_must_match_class_count() {
        let out = RawDetectionOutput::new(OutputShape::new(1, 2), vec![0.0; 4], vec![0.5; 2])
            .unwrap()
            .with_indices(vec![IndexTriple::new(0, 0, 0)]);
        let err = AutoDecoder::new()
            .decode(&out, &ClassCatalog::new(["x"]))
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::ShapeMismatch {
                tensor: "class catalog",
                expected: 2,
                got: 1,
            }
        );
    }
}
