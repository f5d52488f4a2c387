//! Diff generation for audit and UI rendering.

use std::fmt::Write;

use crate::types::diff::{DiffResult, DiffSpan};
use crate::types::sanitization::Replacement;

/// Partition `original` into changed and unchanged spans.
///
/// Replacements are walked in ascending `start` order whatever order they
/// are passed in; their spans must not intersect, as produced by
/// [`Sanitizer::sanitize`](crate::pipeline::Sanitizer::sanitize).
/// Zero-length gaps produce no span. Concatenating the span texts always
/// reproduces `original`.
pub fn generate_diff(original: &str, sanitized: &str, replacements: &[Replacement]) -> DiffResult {
    let mut ordered: Vec<&Replacement> = replacements.iter().collect();
    ordered.sort_by_key(|replacement| replacement.start);

    let mut spans = Vec::with_capacity(replacements.len() * 2 + 1);
    let mut cursor = 0;

    for replacement in ordered {
        if replacement.start > cursor {
            spans.push(DiffSpan::unchanged(
                &original[cursor..replacement.start],
                cursor,
                replacement.start,
            ));
        }
        spans.push(DiffSpan::changed(
            &original[replacement.start..replacement.end],
            &replacement.label,
            replacement.start,
            replacement.end,
        ));
        cursor = replacement.end;
    }

    if cursor < original.len() {
        spans.push(DiffSpan::unchanged(&original[cursor..], cursor, original.len()));
    }

    DiffResult {
        original: original.to_string(),
        sanitized: sanitized.to_string(),
        spans,
        num_changes: replacements.len(),
    }
}

/// Human-readable rendering of a diff.
///
/// ```text
/// === ORIGINAL ===
/// Contact me at
/// [DETECTED: email] john.doe@example.com
///  for details.
///
/// === SANITIZED ===
/// Contact me at [EMAIL] for details.
///
/// === SUMMARY ===
/// Total changes: 1
/// ```
pub fn format_diff_text(diff: &DiffResult) -> String {
    let mut out = String::from("=== ORIGINAL ===\n");

    for span in &diff.spans {
        match (&span.label, span.is_changed) {
            (Some(label), true) => {
                let _ = writeln!(out, "[DETECTED: {}] {}", label, span.text);
            }
            _ => {
                let _ = writeln!(out, "{}", span.text);
            }
        }
    }

    let _ = writeln!(out, "\n=== SANITIZED ===");
    let _ = writeln!(out, "{}", diff.sanitized);
    let _ = writeln!(out, "\n=== SUMMARY ===");
    let _ = write!(out, "Total changes: {}", diff.num_changes);
    out
}
