//! Detected entity types shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::labels;

/// Category a detected entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    /// Personal data: names, contact details, government IDs
    Pii,
    /// Card numbers, bank accounts, amounts
    Financial,
    /// Contracts, agreements, legal documents
    Contract,
    /// Patents, trademarks, trade secrets
    #[serde(rename = "ip")]
    IntellectualProperty,
    /// Organization-specific patterns
    Custom,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 5] = [
        Self::Pii,
        Self::Financial,
        Self::Contract,
        Self::IntellectualProperty,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pii => "pii",
            Self::Financial => "financial",
            Self::Contract => "contract",
            Self::IntellectualProperty => "ip",
            Self::Custom => "custom",
        }
    }

    /// Whether entities of this category make a high-confidence hit a red verdict.
    pub fn is_high_risk(&self) -> bool {
        matches!(self, Self::Pii | Self::Financial)
    }

    /// Generic placeholder used when no label-specific one exists, e.g. `[PII]`.
    pub fn fallback_placeholder(&self) -> String {
        format!("[{}]", self.as_str().to_uppercase())
    }

    /// Map a free-form detector label (e.g. `"phone number"`) to a category.
    ///
    /// Unknown labels map to [`EntityCategory::Pii`].
    pub fn from_label(label: &str) -> Self {
        labels::category_for_label(label).unwrap_or(Self::Pii)
    }

    /// Parse the wire name (`"pii"`, `"financial"`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span of the document believed to contain sensitive data.
///
/// `start`/`end` are half-open byte offsets into the document the entity was
/// detected in. `value` is expected to equal `document[start..end]`; the
/// pipeline does not re-verify this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEntity {
    pub category: EntityCategory,
    pub value: String,
    pub start: usize,
    pub end: usize,
    /// 0.0 to 1.0
    pub confidence: f64,
    /// Detector label: the ML label or the pattern name
    pub source_label: String,
}

impl DetectedEntity {
    pub fn new(
        category: EntityCategory,
        value: impl Into<String>,
        start: usize,
        end: usize,
        confidence: f64,
        source_label: impl Into<String>,
    ) -> Self {
        Self {
            category,
            value: value.into(),
            start,
            end,
            confidence,
            source_label: source_label.into(),
        }
    }

    /// Build an entity from the span it covers in `document`.
    ///
    /// # Panics
    ///
    /// Panics if `start..end` is not a valid char-boundary range of `document`.
    pub fn from_span(
        document: &str,
        category: EntityCategory,
        start: usize,
        end: usize,
        confidence: f64,
        source_label: impl Into<String>,
    ) -> Self {
        Self::new(
            category,
            &document[start..end],
            start,
            end,
            confidence,
            source_label,
        )
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the intersection of the two half-open spans.
    pub fn intersection_len(&self, other: &DetectedEntity) -> usize {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        end.saturating_sub(start)
    }

    pub fn intersects(&self, other: &DetectedEntity) -> bool {
        self.intersection_len(other) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(EntityCategory::Pii.as_str(), "pii");
        assert_eq!(EntityCategory::IntellectualProperty.as_str(), "ip");
        assert_eq!(
            serde_json::to_string(&EntityCategory::IntellectualProperty).unwrap(),
            "\"ip\""
        );
        assert_eq!(EntityCategory::parse("Financial"), Some(EntityCategory::Financial));
        assert_eq!(EntityCategory::parse("secret"), None);
    }

    #[test]
    fn test_fallback_placeholder() {
        assert_eq!(EntityCategory::Pii.fallback_placeholder(), "[PII]");
        assert_eq!(EntityCategory::IntellectualProperty.fallback_placeholder(), "[IP]");
        assert_eq!(EntityCategory::Custom.fallback_placeholder(), "[CUSTOM]");
    }

    #[test]
    fn test_from_label_defaults_to_pii() {
        assert_eq!(EntityCategory::from_label("credit card number"), EntityCategory::Financial);
        assert_eq!(
            EntityCategory::from_label("Trade Secret"),
            EntityCategory::IntellectualProperty
        );
        assert_eq!(EntityCategory::from_label("organization"), EntityCategory::Pii);
    }

    #[test]
    fn test_intersection() {
        let a = DetectedEntity::new(EntityCategory::Pii, "abcdef", 0, 6, 0.9, "a");
        let b = DetectedEntity::new(EntityCategory::Pii, "defgh", 3, 8, 0.9, "b");
        let c = DetectedEntity::new(EntityCategory::Pii, "gh", 6, 8, 0.9, "c");

        assert_eq!(a.intersection_len(&b), 3);
        assert!(a.intersects(&b));
        // Touching spans do not intersect
        assert_eq!(a.intersection_len(&c), 0);
        assert!(!a.intersects(&c));
    }
}
