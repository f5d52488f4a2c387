//! Sanitization strategy and result types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GuardError;

/// How a detected span is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizationStrategy {
    /// Replace with a typed placeholder
    /// Example: john@example.com -> [EMAIL]
    #[default]
    Replace,
    /// Partially mask while keeping structural hints
    /// Example: john.doe@example.com -> j***e@example.com
    Mask,
    /// Remove the span entirely
    Redact,
}

impl SanitizationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Mask => "mask",
            Self::Redact => "redact",
        }
    }
}

impl fmt::Display for SanitizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SanitizationStrategy {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "mask" => Ok(Self::Mask),
            "redact" => Ok(Self::Redact),
            other => Err(GuardError::invalid_config(format!(
                "unknown sanitization strategy '{}'",
                other
            ))),
        }
    }
}

/// One rewritten span. Offsets refer to the original document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub original: String,
    pub placeholder: String,
    /// Source label of the entity that produced this replacement
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Result of sanitizing a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizationResult {
    pub sanitized_text: String,
    /// Ascending original-document order
    pub replacements: Vec<Replacement>,
    pub fully_sanitized: bool,
}

impl SanitizationResult {
    /// Result for a document with nothing to rewrite.
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            sanitized_text: text.into(),
            replacements: Vec::new(),
            fully_sanitized: true,
        }
    }

    pub fn has_replacements(&self) -> bool {
        !self.replacements.is_empty()
    }
}
