//! Structural (regex) entity detection.

pub mod builtin;
pub mod catalog;

pub use builtin::BUILTIN_PATTERNS;
pub use catalog::{PatternCatalog, RegexPattern, DEFAULT_PATTERN_CONFIDENCE};
