//! Risk scoring: merged entities to a green/amber/red verdict.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. Empty document or no entities: green.
//! 2. A high-confidence entity plus a PII/financial entity: red.
//! 3. At least `red_min_entities` entities: red.
//! 4. Any entity in a document longer than [`VERY_LONG_DOCUMENT`]: amber.
//! 5. At least `amber_min_entities` entities: amber.
//! 6. Otherwise green.

use std::sync::{PoisonError, RwLock};

use crate::config::{RiskThresholds, ThresholdUpdate};
use crate::error::Result;
use crate::types::entity::DetectedEntity;
use crate::types::risk::{RiskLevel, RiskScore};

/// Documents longer than this are never scored green once anything is found.
pub const VERY_LONG_DOCUMENT: usize = 10_000;

/// Scores entity lists against thresholds that can be swapped at runtime.
#[derive(Debug, Default)]
pub struct RiskScorer {
    thresholds: RwLock<RiskThresholds>,
}

struct Metrics {
    entity_count: usize,
    high_confidence_count: usize,
    high_risk_count: usize,
    max_confidence: f64,
}

impl RiskScorer {
    pub fn new(thresholds: RiskThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self {
            thresholds: RwLock::new(thresholds),
        })
    }

    /// Current thresholds.
    pub fn thresholds(&self) -> RiskThresholds {
        *self.thresholds.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a partial update. The merged thresholds are validated first;
    /// on error nothing changes.
    pub fn update_thresholds(&self, update: ThresholdUpdate) -> Result<RiskThresholds> {
        let mut thresholds = self.thresholds.write().unwrap_or_else(PoisonError::into_inner);
        let updated = update.apply_to(*thresholds);
        updated.validate()?;
        *thresholds = updated;

        tracing::info!(
            amber_min_entities = updated.amber_min_entities,
            red_min_entities = updated.red_min_entities,
            high_confidence_threshold = updated.high_confidence_threshold,
            "Risk thresholds updated"
        );
        Ok(updated)
    }

    /// Score entities found in a document of `document_length` bytes.
    ///
    /// Thresholds are read once at the start of the call, so a concurrent
    /// update never affects a score in progress.
    pub fn score(&self, entities: &[DetectedEntity], document_length: usize) -> RiskScore {
        score_with(&self.thresholds(), entities, document_length)
    }
}

/// Pure scoring function behind [`RiskScorer::score`].
pub fn score_with(
    thresholds: &RiskThresholds,
    entities: &[DetectedEntity],
    document_length: usize,
) -> RiskScore {
    let metrics = Metrics::collect(thresholds, entities);
    let (level, reasoning) = determine_level(thresholds, &metrics, document_length);

    tracing::debug!(
        level = %level,
        entity_count = metrics.entity_count,
        high_confidence_count = metrics.high_confidence_count,
        max_confidence = metrics.max_confidence,
        "Scored entities"
    );

    RiskScore {
        level,
        entity_count: metrics.entity_count,
        high_confidence_count: metrics.high_confidence_count,
        max_confidence: metrics.max_confidence,
        reasoning,
    }
}

impl Metrics {
    fn collect(thresholds: &RiskThresholds, entities: &[DetectedEntity]) -> Self {
        Self {
            entity_count: entities.len(),
            high_confidence_count: entities
                .iter()
                .filter(|e| e.confidence >= thresholds.high_confidence_threshold)
                .count(),
            high_risk_count: entities.iter().filter(|e| e.category.is_high_risk()).count(),
            max_confidence: entities.iter().map(|e| e.confidence).fold(0.0, f64::max),
        }
    }
}

fn determine_level(
    thresholds: &RiskThresholds,
    metrics: &Metrics,
    document_length: usize,
) -> (RiskLevel, String) {
    let threshold = thresholds.high_confidence_threshold;

    if document_length == 0 || metrics.entity_count == 0 {
        return (RiskLevel::Green, "No sensitive data detected".to_string());
    }

    if metrics.high_confidence_count > 0
        && metrics.high_risk_count > 0
        && metrics.max_confidence >= threshold
    {
        return (
            RiskLevel::Red,
            format!(
                "High-confidence sensitive data detected ({} entities with confidence >= {})",
                metrics.high_confidence_count, threshold
            ),
        );
    }

    if metrics.entity_count >= thresholds.red_min_entities {
        return (
            RiskLevel::Red,
            format!(
                "Multiple sensitive entities detected ({} entities)",
                metrics.entity_count
            ),
        );
    }

    if document_length > VERY_LONG_DOCUMENT {
        return (
            RiskLevel::Amber,
            format!(
                "Sensitive data detected in very long prompt ({} entities)",
                metrics.entity_count
            ),
        );
    }

    if metrics.entity_count >= thresholds.amber_min_entities {
        let reasoning = if metrics.max_confidence < threshold {
            format!(
                "Low-confidence sensitive data detected ({} entities, max confidence {:.2})",
                metrics.entity_count, metrics.max_confidence
            )
        } else {
            format!("Sensitive data detected ({} entities)", metrics.entity_count)
        };
        return (RiskLevel::Amber, reasoning);
    }

    (
        RiskLevel::Green,
        "No significant sensitive data detected".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;
    use crate::types::entity::EntityCategory;

    fn entity(category: EntityCategory, confidence: f64) -> DetectedEntity {
        DetectedEntity::new(category, "value", 0, 5, confidence, "label")
    }

    fn scorer() -> RiskScorer {
        RiskScorer::default()
    }

    #[test]
    fn test_empty_document_is_green() {
        let score = scorer().score(&[], 0);
        assert_eq!(score.level, RiskLevel::Green);
        assert_eq!(score.entity_count, 0);
        assert!(score.reasoning.to_lowercase().contains("no sensitive data"));
    }

    #[test]
    fn test_no_entities_is_green() {
        let score = scorer().score(&[], 120);
        assert_eq!(score.level, RiskLevel::Green);
        assert_eq!(score.max_confidence, 0.0);
    }

    #[test]
    fn test_high_confidence_pii_is_red() {
        let score = scorer().score(&[entity(EntityCategory::Pii, 0.95)], 50);
        assert_eq!(score.level, RiskLevel::Red);
        assert_eq!(score.high_confidence_count, 1);
        assert!(score.reasoning.starts_with("High-confidence"));
    }

    #[test]
    fn test_confidence_equal_to_threshold_counts_as_high() {
        let at_threshold = entity(EntityCategory::Financial, 0.7);
        let score = scorer().score(&[at_threshold], 50);
        assert_eq!(score.level, RiskLevel::Red);
        assert_eq!(score.high_confidence_count, 1);
        assert!(score.reasoning.starts_with("High-confidence"));

        let just_below = entity(EntityCategory::Financial, 0.69);
        let score = scorer().score(&[just_below], 50);
        assert_eq!(score.level, RiskLevel::Amber);
        assert_eq!(score.high_confidence_count, 0);
    }

    #[test]
    fn test_high_confidence_needs_high_risk_category() {
        let score = scorer().score(&[entity(EntityCategory::Contract, 0.95)], 50);
        assert_eq!(score.level, RiskLevel::Amber);
        assert_eq!(score.reasoning, "Sensitive data detected (1 entities)");
    }

    #[test]
    fn test_high_confidence_and_high_risk_may_be_different_entities() {
        let entities = [
            entity(EntityCategory::IntellectualProperty, 0.9),
            entity(EntityCategory::Financial, 0.3),
        ];
        assert_eq!(scorer().score(&entities, 50).level, RiskLevel::Red);
    }

    #[test]
    fn test_low_confidence_mixed_categories_is_amber() {
        let entities = [
            entity(EntityCategory::Pii, 0.6),
            entity(EntityCategory::Contract, 0.65),
            entity(EntityCategory::Financial, 0.6),
        ];

        let score = scorer().score(&entities, 100);

        assert_eq!(score.level, RiskLevel::Amber);
        assert_eq!(score.entity_count, 3);
        assert_eq!(score.high_confidence_count, 0);
        assert_eq!(score.max_confidence, 0.65);
        assert!(score.reasoning.starts_with("Low-confidence"));
        assert!(score.reasoning.contains("0.65"));
    }

    #[test]
    fn test_entity_count_rule_is_red_regardless_of_confidence() {
        let entities = [
            entity(EntityCategory::Pii, 0.3),
            entity(EntityCategory::Financial, 0.4),
            entity(EntityCategory::Pii, 0.2),
            entity(EntityCategory::Financial, 0.5),
        ];

        let score = scorer().score(&entities, 100);

        assert_eq!(score.level, RiskLevel::Red);
        assert!(score.reasoning.starts_with("Multiple sensitive entities"));
    }

    #[test]
    fn test_very_long_document_is_amber() {
        let thresholds = RiskThresholds {
            amber_min_entities: 3,
            red_min_entities: 5,
            ..Default::default()
        };
        let scorer = RiskScorer::new(thresholds).unwrap();
        let entities = [entity(EntityCategory::Contract, 0.4)];

        // Below amber_min_entities in a normal document
        assert_eq!(scorer.score(&entities, 500).level, RiskLevel::Green);
        // Conservative on long documents
        let score = scorer.score(&entities, VERY_LONG_DOCUMENT + 1);
        assert_eq!(score.level, RiskLevel::Amber);
        assert!(score.reasoning.contains("very long"));
    }

    #[test]
    fn test_metrics_reported_regardless_of_rule() {
        let entities = [
            entity(EntityCategory::Pii, 0.9),
            entity(EntityCategory::Pii, 0.75),
            entity(EntityCategory::Pii, 0.2),
        ];
        let score = scorer().score(&entities, 100);
        assert_eq!(score.entity_count, 3);
        assert_eq!(score.high_confidence_count, 2);
        assert_eq!(score.max_confidence, 0.9);
    }

    #[test]
    fn test_update_thresholds() {
        let scorer = scorer();
        let entities = vec![entity(EntityCategory::Contract, 0.5); 2];
        assert_eq!(scorer.score(&entities, 100).level, RiskLevel::Amber);

        scorer
            .update_thresholds(ThresholdUpdate {
                red_min_entities: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(scorer.score(&entities, 100).level, RiskLevel::Red);
    }

    #[test]
    fn test_invalid_update_keeps_thresholds() {
        let scorer = scorer();
        let err = scorer
            .update_thresholds(ThresholdUpdate {
                amber_min_entities: Some(10),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, GuardError::InvalidConfig { .. }));
        assert_eq!(scorer.thresholds(), RiskThresholds::default());
    }

    #[test]
    fn test_new_rejects_invalid_thresholds() {
        let thresholds = RiskThresholds {
            high_confidence_threshold: -0.5,
            ..Default::default()
        };
        assert!(RiskScorer::new(thresholds).is_err());
    }
}
