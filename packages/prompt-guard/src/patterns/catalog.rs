//! Pattern catalog: named, compiled detectors bound to a category.
//!
//! Registration is rare (configuration time) and detection is frequent
//! (request time), so the pattern list sits behind a single `RwLock`:
//! detections share read access, registrations take the write lock only
//! after the new patterns compiled.

use regex::{Regex, RegexBuilder};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use super::builtin::BUILTIN_PATTERNS;
use crate::config::CustomPattern;
use crate::error::{GuardError, Result};
use crate::types::entity::{DetectedEntity, EntityCategory};

/// Confidence given to runtime-registered patterns when none is specified.
pub const DEFAULT_PATTERN_CONFIDENCE: f64 = 0.8;

/// Post-match check for shapes a regex alone cannot express.
pub type MatchValidator = fn(&str) -> bool;

/// A compiled detector.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    pub name: String,
    pub regex: Regex,
    pub category: EntityCategory,
    pub confidence: f64,
    validator: Option<MatchValidator>,
}

impl RegexPattern {
    pub fn new(
        name: impl Into<String>,
        regex: Regex,
        category: EntityCategory,
        confidence: f64,
    ) -> Self {
        Self {
            name: name.into(),
            regex,
            category,
            confidence,
            validator: None,
        }
    }

    /// Discard matches the validator rejects.
    pub fn with_validator(mut self, validator: MatchValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Non-overlapping matches as `(start, end, text)`.
    pub fn find_matches<'t>(
        &'t self,
        text: &'t str,
    ) -> impl Iterator<Item = (usize, usize, &'t str)> + 't {
        self.regex
            .find_iter(text)
            .filter(move |m| self.validator.map_or(true, |accept| accept(m.as_str())))
            .map(|m| (m.start(), m.end(), m.as_str()))
    }

    fn detect_into(&self, document: &str, out: &mut Vec<DetectedEntity>) {
        for (start, end, value) in self.find_matches(document) {
            out.push(DetectedEntity::new(
                self.category,
                value,
                start,
                end,
                self.confidence,
                self.name.as_str(),
            ));
        }
    }
}

/// Ordered collection of detectors, shared across requests.
#[derive(Debug, Default)]
pub struct PatternCatalog {
    patterns: RwLock<Vec<RegexPattern>>,
}

impl PatternCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the built-in detectors.
    pub fn with_builtins() -> Self {
        Self {
            patterns: RwLock::new(BUILTIN_PATTERNS.clone()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<RegexPattern>> {
        self.patterns.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn append(&self, new_patterns: Vec<RegexPattern>) {
        let mut patterns = self.patterns.write().unwrap_or_else(PoisonError::into_inner);
        patterns.extend(new_patterns);
    }

    /// Register a pattern with [`DEFAULT_PATTERN_CONFIDENCE`].
    pub fn register(
        &self,
        name: &str,
        pattern_source: &str,
        category: EntityCategory,
    ) -> Result<()> {
        self.register_with_confidence(name, pattern_source, category, DEFAULT_PATTERN_CONFIDENCE)
    }

    /// Compile and append a pattern. Patterns registered at runtime match
    /// case-insensitively.
    ///
    /// On failure the catalog is left unchanged.
    pub fn register_with_confidence(
        &self,
        name: &str,
        pattern_source: &str,
        category: EntityCategory,
        confidence: f64,
    ) -> Result<()> {
        let pattern = compile(name, pattern_source, category, confidence)?;
        self.append(vec![pattern]);
        tracing::debug!(pattern = %name, category = %category, "Registered detection pattern");
        Ok(())
    }

    /// Register every enabled custom pattern from configuration.
    ///
    /// All enabled patterns are compiled before any is added, so an invalid
    /// pattern leaves the catalog unchanged. Returns how many were added.
    pub fn register_custom(&self, custom: &[CustomPattern]) -> Result<usize> {
        let mut compiled = Vec::with_capacity(custom.len());
        for pattern in custom {
            if !pattern.enabled {
                tracing::warn!(pattern = %pattern.name, "Skipping disabled custom pattern");
                continue;
            }
            compiled.push(compile(
                &pattern.name,
                &pattern.pattern,
                pattern.category,
                pattern.confidence,
            )?);
        }

        let added = compiled.len();
        self.append(compiled);
        tracing::info!(added, skipped = custom.len() - added, "Registered custom patterns");
        Ok(added)
    }

    /// Run every pattern over the document.
    ///
    /// Matches are grouped by pattern in registration order; a single
    /// pattern's matches never overlap each other.
    pub fn detect(&self, document: &str) -> Vec<DetectedEntity> {
        if document.trim().is_empty() {
            return Vec::new();
        }

        let patterns = self.read();
        let mut entities = Vec::new();
        for pattern in patterns.iter() {
            pattern.detect_into(document, &mut entities);
        }

        tracing::debug!(
            patterns = patterns.len(),
            entities = entities.len(),
            "Pattern detection complete"
        );
        entities
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Pattern names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.read().iter().map(|p| p.name.clone()).collect()
    }
}

fn compile(
    name: &str,
    pattern_source: &str,
    category: EntityCategory,
    confidence: f64,
) -> Result<RegexPattern> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(GuardError::invalid_config(format!(
            "confidence for pattern '{}' must be between 0 and 1, got {}",
            name, confidence
        )));
    }

    let regex = RegexBuilder::new(pattern_source)
        .case_insensitive(true)
        .build()
        .map_err(|source| GuardError::InvalidPattern {
            name: name.to_string(),
            source,
        })?;

    Ok(RegexPattern::new(name, regex, category, confidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn test_detect_tags_entities_with_pattern_metadata() {
        let catalog = PatternCatalog::with_builtins();
        let text = "Contact me at john.doe@example.com for details.";

        let entities = catalog.detect(text);

        assert_eq!(entities.len(), 1);
        let email = &entities[0];
        assert_eq!(email.category, EntityCategory::Pii);
        assert_eq!(email.value, "john.doe@example.com");
        assert_eq!((email.start, email.end), (14, 34));
        assert_eq!(email.confidence, 0.95);
        assert_eq!(email.source_label, "email");
        assert_eq!(&text[email.start..email.end], email.value);
    }

    #[test]
    fn test_empty_and_whitespace_documents() {
        let catalog = PatternCatalog::with_builtins();
        assert!(catalog.detect("").is_empty());
        assert!(catalog.detect("   \n\t ").is_empty());
    }

    #[test]
    fn test_register_custom_pattern() {
        let catalog = PatternCatalog::new();
        catalog
            .register("project_code", r"PRJ-[0-9]{4}", EntityCategory::Custom)
            .unwrap();

        let entities = catalog.detect("Ship prj-1234 and PRJ-5678 today");

        // Runtime patterns are case-insensitive
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].value, "prj-1234");
        assert_eq!(entities[1].value, "PRJ-5678");
        assert_eq!(entities[0].confidence, DEFAULT_PATTERN_CONFIDENCE);
        assert_eq!(entities[0].source_label, "project_code");
    }

    #[test]
    fn test_invalid_pattern_leaves_catalog_unchanged() {
        let catalog = PatternCatalog::with_builtins();
        let before = catalog.names();

        let err = catalog
            .register("broken", r"(unclosed", EntityCategory::Custom)
            .unwrap_err();

        assert!(matches!(err, GuardError::InvalidPattern { ref name, .. } if name == "broken"));
        assert_eq!(catalog.names(), before);
    }

    #[test]
    fn test_register_rejects_out_of_range_confidence() {
        let catalog = PatternCatalog::new();
        let err = catalog
            .register_with_confidence("code", r"X[0-9]+", EntityCategory::Custom, 1.5)
            .unwrap_err();
        assert!(matches!(err, GuardError::InvalidConfig { .. }));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_register_custom_batch_is_all_or_nothing() {
        let catalog = PatternCatalog::new();
        let batch = vec![
            CustomPattern::new("ok", r"OK-[0-9]+", EntityCategory::Custom),
            CustomPattern::new("bad", r"[", EntityCategory::Custom),
        ];

        assert!(catalog.register_custom(&batch).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_register_custom_skips_disabled() {
        let catalog = PatternCatalog::new();
        let batch = vec![
            CustomPattern::new("matter", r"MATTER-[0-9]+", EntityCategory::Contract),
            CustomPattern::new("ignored", r"[", EntityCategory::Custom).disabled(),
        ];

        assert_eq!(catalog.register_custom(&batch).unwrap(), 1);
        assert_eq!(catalog.names(), vec!["matter".to_string()]);
    }

    /// Log sink shared with a test subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_skipped_custom_pattern_logs_warning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let catalog = PatternCatalog::new();
        let batch = vec![CustomPattern::new("ignored", r"X", EntityCategory::Custom).disabled()];
        let added = tracing::subscriber::with_default(subscriber, || {
            catalog.register_custom(&batch).unwrap()
        });

        assert_eq!(added, 0);
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("Skipping disabled custom pattern"));
        assert!(output.contains("ignored"));
    }

    #[test]
    fn test_concurrent_detection_and_registration() {
        let catalog = Arc::new(PatternCatalog::with_builtins());
        let builtin_count = catalog.len();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let entities = catalog.detect("mail a@b.io or call 555-123-4567");
                        assert!(entities.len() >= 2);
                    }
                })
            })
            .collect();

        let writer = {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                for i in 0..10 {
                    catalog
                        .register(&format!("code_{}", i), r"CODE-[0-9]+", EntityCategory::Custom)
                        .unwrap();
                }
            })
        };

        for handle in readers {
            handle.join().unwrap();
        }
        writer.join().unwrap();

        assert_eq!(catalog.len(), builtin_count + 10);
    }
}
