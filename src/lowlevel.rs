//! Low-level building blocks for custom decoding pipelines.
//!
//! These expose the individual stages the decoders chain together:
//! candidate extraction, per-class suppression and result assembly. Most
//! users should prefer a `Decoder` implementation.
//!
//! [`nms_per_class`] accepts an IoU threshold in `[0, 1)`, while
//! `DecodeConfig::validate` requires `(0, 1)`.

pub use crate::assemble::{assemble_candidates, check_catalog, gather_indexed};
pub use crate::candidate::extract::extract_candidates;
pub use crate::candidate::nms::nms_per_class;
#[cfg(feature = "rayon")]
pub use crate::candidate::nms::nms_per_class_par;
pub use crate::candidate::Candidate;
