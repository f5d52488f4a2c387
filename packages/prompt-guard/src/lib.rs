//! Sensitive-Data Prompt Guard
//!
//! Flags and redacts personal, financial, legal and IP-related data inside
//! free-text prompts before they are logged or forwarded.
//!
//! # Pipeline
//!
//! - Pattern detection ([`PatternCatalog`]) and an optional ML
//!   [`EntitySource`] produce entity lists over the same document
//! - [`merge()`] reconciles them; ML detections are authoritative
//! - [`RiskScorer`] assigns a green/amber/red verdict
//! - [`Sanitizer`] rewrites the text and logs every replacement
//! - [`generate_diff`] builds an audit view from the replacement log
//!
//! # Usage
//!
//! ```rust,ignore
//! use prompt_guard::{GuardConfig, PromptGuard, RiskLevel, SanitizationStrategy};
//!
//! let guard = PromptGuard::from_config(GuardConfig::from_env()?)?
//!     .with_source(model);
//!
//! let inspection = guard.inspect(prompt, Some(SanitizationStrategy::Mask)).await?;
//! let outgoing = match inspection.risk.level {
//!     RiskLevel::Green => prompt,
//!     _ => inspection.sanitization.sanitized_text.as_str(),
//! };
//! store(inspection.record());
//! ```
//!
//! # Modules
//!
//! - [`types`] - Value types shared by every stage
//! - [`patterns`] - Built-in and runtime-registered regex detectors
//! - [`pipeline`] - Merge, risk scoring, sanitization, diff and the orchestrator
//! - [`labels`] - Label normalization and placeholder lookup
//! - [`traits`] - The ML entity source seam
//! - [`config`] - Configuration loading and validation
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod error;
pub mod labels;
pub mod patterns;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::{CustomPattern, GuardConfig, RiskThresholds, ThresholdUpdate};
pub use error::{GuardError, Result};
pub use patterns::{PatternCatalog, RegexPattern};
pub use pipeline::{
    format_diff_text, generate_diff, merge, resolve_overlaps, Inspection, PromptGuard, RiskScorer,
    Sanitizer,
};
pub use traits::EntitySource;
pub use types::{
    diff::{DiffResult, DiffSpan},
    entity::{DetectedEntity, EntityCategory},
    record::ScanRecord,
    risk::{RiskLevel, RiskScore},
    sanitization::{Replacement, SanitizationResult, SanitizationStrategy},
};
