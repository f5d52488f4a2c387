//! Guard configuration.
//!
//! Values normally come from the configuration collaborator (JSON) or the
//! environment. Everything is validated before it reaches the pipeline.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::{GuardError, Result};
use crate::labels::DEFAULT_ML_LABELS;
use crate::patterns::DEFAULT_PATTERN_CONFIDENCE;
use crate::types::entity::EntityCategory;
use crate::types::sanitization::SanitizationStrategy;

const ENV_AMBER_MIN_ENTITIES: &str = "PROMPT_GUARD_AMBER_MIN_ENTITIES";
const ENV_RED_MIN_ENTITIES: &str = "PROMPT_GUARD_RED_MIN_ENTITIES";
const ENV_HIGH_CONFIDENCE_THRESHOLD: &str = "PROMPT_GUARD_HIGH_CONFIDENCE_THRESHOLD";
const ENV_DEFAULT_STRATEGY: &str = "PROMPT_GUARD_DEFAULT_STRATEGY";
const ENV_OVERLAP_THRESHOLD: &str = "PROMPT_GUARD_OVERLAP_THRESHOLD";
const ENV_DETECTION_THRESHOLD: &str = "PROMPT_GUARD_DETECTION_THRESHOLD";

/// Thresholds for the risk scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Minimum entities for an amber verdict. Default: 1.
    pub amber_min_entities: usize,
    /// Minimum entities for a red verdict. Default: 4.
    pub red_min_entities: usize,
    /// Confidence at or above which an entity counts as high-confidence.
    /// Default: 0.7.
    pub high_confidence_threshold: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            amber_min_entities: 1,
            red_min_entities: 4,
            high_confidence_threshold: 0.7,
        }
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.red_min_entities < self.amber_min_entities {
            return Err(GuardError::invalid_config(format!(
                "red_min_entities ({}) must be >= amber_min_entities ({})",
                self.red_min_entities, self.amber_min_entities
            )));
        }
        check_unit_interval("high_confidence_threshold", self.high_confidence_threshold)
    }
}

/// Partial threshold update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdUpdate {
    pub amber_min_entities: Option<usize>,
    pub red_min_entities: Option<usize>,
    pub high_confidence_threshold: Option<f64>,
}

impl ThresholdUpdate {
    pub fn apply_to(&self, current: RiskThresholds) -> RiskThresholds {
        RiskThresholds {
            amber_min_entities: self.amber_min_entities.unwrap_or(current.amber_min_entities),
            red_min_entities: self.red_min_entities.unwrap_or(current.red_min_entities),
            high_confidence_threshold: self
                .high_confidence_threshold
                .unwrap_or(current.high_confidence_threshold),
        }
    }
}

/// Organization-specific detection pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub name: String,
    pub pattern: String,
    pub category: EntityCategory,
    #[serde(default = "default_pattern_confidence")]
    pub confidence: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_pattern_confidence() -> f64 {
    DEFAULT_PATTERN_CONFIDENCE
}

fn default_enabled() -> bool {
    true
}

impl CustomPattern {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        category: EntityCategory,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            category,
            confidence: DEFAULT_PATTERN_CONFIDENCE,
            enabled: true,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GuardError::invalid_config("custom pattern name cannot be empty"));
        }
        check_unit_interval("custom pattern confidence", self.confidence)?;
        regex::Regex::new(&self.pattern).map_err(|source| GuardError::InvalidPattern {
            name: self.name.clone(),
            source,
        })?;
        Ok(())
    }
}

/// Configuration for the whole guard pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub thresholds: RiskThresholds,

    /// Strategy used when a call does not pick one. Default: replace.
    pub default_strategy: SanitizationStrategy,

    /// Minimum overlap ratio (against the shorter span) for a pattern match
    /// to count as a duplicate of an ML detection. Default: 0.5.
    pub overlap_threshold: f64,

    /// Minimum confidence requested from the ML source. Default: 0.5.
    pub detection_threshold: f64,

    /// Labels requested from the ML source.
    pub labels: Vec<String>,

    pub custom_patterns: Vec<CustomPattern>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            default_strategy: SanitizationStrategy::default(),
            overlap_threshold: 0.5,
            detection_threshold: 0.5,
            labels: DEFAULT_ML_LABELS.iter().map(|l| l.to_string()).collect(),
            custom_patterns: Vec::new(),
        }
    }
}

impl GuardConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load overrides from `PROMPT_GUARD_*` environment variables on top of
    /// the defaults. A `.env` file is read if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Some(value) = env_parse(ENV_AMBER_MIN_ENTITIES)? {
            config.thresholds.amber_min_entities = value;
        }
        if let Some(value) = env_parse(ENV_RED_MIN_ENTITIES)? {
            config.thresholds.red_min_entities = value;
        }
        if let Some(value) = env_parse(ENV_HIGH_CONFIDENCE_THRESHOLD)? {
            config.thresholds.high_confidence_threshold = value;
        }
        if let Some(value) = env_parse(ENV_DEFAULT_STRATEGY)? {
            config.default_strategy = value;
        }
        if let Some(value) = env_parse(ENV_OVERLAP_THRESHOLD)? {
            config.overlap_threshold = value;
        }
        if let Some(value) = env_parse(ENV_DETECTION_THRESHOLD)? {
            config.detection_threshold = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_default_strategy(mut self, strategy: SanitizationStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    pub fn with_overlap_threshold(mut self, threshold: f64) -> Self {
        self.overlap_threshold = threshold;
        self
    }

    pub fn with_detection_threshold(mut self, threshold: f64) -> Self {
        self.detection_threshold = threshold;
        self
    }

    pub fn with_labels(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.labels = labels.into_iter().map(|l| l.into()).collect();
        self
    }

    pub fn with_custom_pattern(mut self, pattern: CustomPattern) -> Self {
        self.custom_patterns.push(pattern);
        self
    }

    /// Check ranges and that every enabled custom pattern compiles.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        check_unit_interval("overlap_threshold", self.overlap_threshold)?;
        check_unit_interval("detection_threshold", self.detection_threshold)?;
        for pattern in self.custom_patterns.iter().filter(|p| p.enabled) {
            pattern.validate()?;
        }
        Ok(())
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GuardError::invalid_config(format!(
            "{} must be between 0 and 1, got {}",
            field, value
        )))
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| GuardError::invalid_config(format!("{} is invalid: {}", key, e))),
        Err(_) => Ok(None),
    }
}
