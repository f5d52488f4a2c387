//! The guard pipeline stages.
//!
//! Pattern and ML detections are reconciled by [`merge()`], then scored by
//! [`RiskScorer`] and rewritten by [`Sanitizer`]; [`generate_diff`] builds
//! the audit view from the replacement log.

pub mod diff;
pub mod guard;
pub mod merge;
pub mod risk;
pub mod sanitize;

pub use diff::{format_diff_text, generate_diff};
pub use guard::{Inspection, PromptGuard};
pub use merge::{
    entities_overlap, merge, merge_all, overlap_ratio, resolve_overlaps, DEFAULT_OVERLAP_THRESHOLD,
};
pub use risk::{score_with, RiskScorer, VERY_LONG_DOCUMENT};
pub use sanitize::{mask_value, Sanitizer};
