//! Span-annotated view of original vs. sanitized text.

use serde::{Deserialize, Serialize};

/// A contiguous run of the original document, changed or unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    pub text: String,
    pub is_changed: bool,
    /// Label of the replacement, set on changed spans only
    pub label: Option<String>,
    pub start: usize,
    pub end: usize,
}

impl DiffSpan {
    pub fn unchanged(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            is_changed: false,
            label: None,
            start,
            end,
        }
    }

    pub fn changed(
        text: impl Into<String>,
        label: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            text: text.into(),
            is_changed: true,
            label: Some(label.into()),
            start,
            end,
        }
    }
}

/// Partition of the original document into changed/unchanged spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub original: String,
    pub sanitized: String,
    pub spans: Vec<DiffSpan>,
    pub num_changes: usize,
}

impl DiffResult {
    /// Concatenation of every span's text; equals `original`.
    pub fn reconstruct(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    pub fn changed_spans(&self) -> impl Iterator<Item = &DiffSpan> {
        self.spans.iter().filter(|span| span.is_changed)
    }
}
