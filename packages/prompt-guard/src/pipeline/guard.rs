//! End-to-end inspection: detect, merge, score, sanitize, diff.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::instrument;

use crate::config::{GuardConfig, RiskThresholds, ThresholdUpdate};
use crate::error::Result;
use crate::patterns::PatternCatalog;
use crate::pipeline::diff::generate_diff;
use crate::pipeline::merge::merge;
use crate::pipeline::risk::RiskScorer;
use crate::pipeline::sanitize::Sanitizer;
use crate::traits::EntitySource;
use crate::types::diff::DiffResult;
use crate::types::entity::DetectedEntity;
use crate::types::record::ScanRecord;
use crate::types::risk::RiskScore;
use crate::types::sanitization::{SanitizationResult, SanitizationStrategy};

/// Everything produced for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    /// Merged entities, sorted by start offset
    pub entities: Vec<DetectedEntity>,
    pub risk: RiskScore,
    pub sanitization: SanitizationResult,
    pub diff: DiffResult,
}

impl Inspection {
    /// Mean entity confidence, or 1.0 when nothing was detected.
    pub fn overall_confidence(&self) -> f64 {
        if self.entities.is_empty() {
            return 1.0;
        }
        let total: f64 = self.entities.iter().map(|e| e.confidence).sum();
        total / self.entities.len() as f64
    }

    /// Summary for the persistence collaborator. Contains no detected values.
    pub fn record(&self) -> ScanRecord {
        let types: BTreeSet<&str> = self.entities.iter().map(|e| e.category.as_str()).collect();
        ScanRecord {
            risk_level: self.risk.level,
            prompt_length: self.diff.original.len(),
            entity_count: self.entities.len(),
            detected_entity_types: types.into_iter().map(str::to_string).collect(),
            was_sanitized: self.sanitization.has_replacements(),
        }
    }
}

/// The guard pipeline.
///
/// Owns the pattern catalog and risk thresholds; an optional
/// [`EntitySource`] supplies ML detections that take precedence over
/// pattern matches covering the same span.
pub struct PromptGuard {
    source: Option<Arc<dyn EntitySource>>,
    catalog: Arc<PatternCatalog>,
    scorer: RiskScorer,
    sanitizer: Sanitizer,
    config: GuardConfig,
}

impl PromptGuard {
    /// Guard with built-in patterns and default configuration.
    pub fn new() -> Self {
        Self {
            source: None,
            catalog: Arc::new(PatternCatalog::with_builtins()),
            scorer: RiskScorer::default(),
            sanitizer: Sanitizer::default(),
            config: GuardConfig::default(),
        }
    }

    /// Validate `config` and build a guard with its thresholds, strategy and
    /// custom patterns on top of the built-in patterns.
    pub fn from_config(config: GuardConfig) -> Result<Self> {
        config.validate()?;

        let catalog = PatternCatalog::with_builtins();
        catalog.register_custom(&config.custom_patterns)?;

        Ok(Self {
            source: None,
            catalog: Arc::new(catalog),
            scorer: RiskScorer::new(config.thresholds)?,
            sanitizer: Sanitizer::new(config.default_strategy),
            config,
        })
    }

    /// Use an ML entity source.
    pub fn with_source(mut self, source: Arc<dyn EntitySource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Shared pattern catalog, for registering patterns at runtime.
    pub fn catalog(&self) -> &Arc<PatternCatalog> {
        &self.catalog
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.scorer.thresholds()
    }

    pub fn update_thresholds(&self, update: ThresholdUpdate) -> Result<RiskThresholds> {
        self.scorer.update_thresholds(update)
    }

    /// Run the full pipeline over `document`.
    ///
    /// ML detections (if a source is configured) are primary; pattern matches
    /// that overlap them are dropped. Empty and whitespace-only documents
    /// skip detection entirely.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the ML source fails.
    #[instrument(skip(self, document), fields(document_len = document.len()))]
    pub async fn inspect(
        &self,
        document: &str,
        strategy: Option<SanitizationStrategy>,
    ) -> Result<Inspection> {
        if document.trim().is_empty() {
            return Ok(self.assemble(document, Vec::new(), strategy));
        }

        let primary = match &self.source {
            Some(source) => {
                let entities = source
                    .predict(document, &self.config.labels, self.config.detection_threshold)
                    .await
                    .map_err(|e| {
                        tracing::warn!(source = source.name(), error = %e, "Entity source failed");
                        e
                    })?;
                tracing::debug!(
                    source = source.name(),
                    count = entities.len(),
                    "Entity source returned"
                );
                entities
            }
            None => Vec::new(),
        };

        let secondary = self.catalog.detect(document);
        let entities = merge(primary, secondary, self.config.overlap_threshold);

        Ok(self.assemble(document, entities, strategy))
    }

    /// Run the pipeline with pattern detection only, skipping the ML source.
    pub fn inspect_patterns(
        &self,
        document: &str,
        strategy: Option<SanitizationStrategy>,
    ) -> Inspection {
        let entities = self.catalog.detect(document);
        self.assemble(document, entities, strategy)
    }

    fn assemble(
        &self,
        document: &str,
        entities: Vec<DetectedEntity>,
        strategy: Option<SanitizationStrategy>,
    ) -> Inspection {
        let risk = self.scorer.score(&entities, document.len());
        let sanitization = self.sanitizer.sanitize(document, &entities, strategy);
        let diff = generate_diff(
            document,
            &sanitization.sanitized_text,
            &sanitization.replacements,
        );

        tracing::info!(
            risk_level = %risk.level,
            entity_count = entities.len(),
            replacements = sanitization.replacements.len(),
            fully_sanitized = sanitization.fully_sanitized,
            "Inspected document"
        );

        Inspection {
            entities,
            risk,
            sanitization,
            diff,
        }
    }
}

impl Default for PromptGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomPattern;
    use crate::testing::MockEntitySource;
    use crate::types::entity::EntityCategory;
    use crate::types::risk::RiskLevel;

    #[tokio::test]
    async fn test_patterns_only_inspection() {
        let guard = PromptGuard::new();
        let text = "Contact me at john.doe@example.com for details.";

        let inspection = guard.inspect(text, None).await.unwrap();

        assert_eq!(inspection.entities.len(), 1);
        assert_eq!(inspection.risk.level, RiskLevel::Red);
        assert_eq!(
            inspection.sanitization.sanitized_text,
            "Contact me at [EMAIL] for details."
        );
        assert_eq!(inspection.diff.reconstruct(), text);
    }

    #[tokio::test]
    async fn test_whitespace_document_is_green() {
        let source = Arc::new(MockEntitySource::new());
        let guard = PromptGuard::new().with_source(source.clone());

        let inspection = guard.inspect("   \n\t", None).await.unwrap();

        assert!(inspection.entities.is_empty());
        assert_eq!(inspection.risk.level, RiskLevel::Green);
        assert_eq!(inspection.sanitization.sanitized_text, "   \n\t");
        assert_eq!(inspection.overall_confidence(), 1.0);
        // No detection is attempted
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ml_detections_take_precedence() {
        let text = "Email jane@corp.com today";
        let ml = DetectedEntity::from_span(text, EntityCategory::Pii, 6, 19, 0.6, "email");
        let source = Arc::new(MockEntitySource::new().with_entities(text, vec![ml]));
        let guard = PromptGuard::new().with_source(source.clone());

        let inspection = guard.inspect(text, None).await.unwrap();

        assert_eq!(inspection.entities.len(), 1);
        assert_eq!(inspection.entities[0].confidence, 0.6);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_source_failure_is_returned() {
        let guard =
            PromptGuard::new().with_source(Arc::new(MockEntitySource::new().failing("model down")));
        assert!(guard.inspect("call 555-123-4567", None).await.is_err());
    }

    #[test]
    fn test_from_config_registers_custom_patterns() {
        let config = GuardConfig::new()
            .with_default_strategy(SanitizationStrategy::Redact)
            .with_custom_pattern(CustomPattern::new(
                "matter",
                r"MATTER-\d{4}",
                EntityCategory::Contract,
            ));
        let guard = PromptGuard::from_config(config).unwrap();

        let inspection = guard.inspect_patterns("See matter-2024 notes", None);

        assert_eq!(inspection.entities.len(), 1);
        assert_eq!(inspection.entities[0].category, EntityCategory::Contract);
        assert_eq!(inspection.sanitization.sanitized_text, "See  notes");
    }

    #[test]
    fn test_record_has_no_values() {
        let guard = PromptGuard::new();
        let text = "Mail a@b.io or call 555-123-4567, card 4111 1111 1111 1111";

        let inspection = guard.inspect_patterns(text, Some(SanitizationStrategy::Mask));
        let record = inspection.record();

        assert_eq!(record.prompt_length, text.len());
        assert_eq!(record.entity_count, inspection.entities.len());
        assert_eq!(record.detected_entity_types, vec!["financial", "pii"]);
        assert!(record.was_sanitized);
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("a@b.io"));
    }

    #[test]
    fn test_update_thresholds_changes_verdict() {
        let guard = PromptGuard::new();
        let text = "Ref MATTER-1234";
        guard
            .catalog()
            .register("matter", r"MATTER-\d{4}", EntityCategory::Contract)
            .unwrap();
        assert_eq!(guard.inspect_patterns(text, None).risk.level, RiskLevel::Amber);

        guard
            .update_thresholds(ThresholdUpdate {
                red_min_entities: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(guard.inspect_patterns(text, None).risk.level, RiskLevel::Red);
    }
}
