use crate::labels;
use crate::pipeline::merge::resolve_overlaps;
use crate::types::entity::DetectedEntity;
use crate::types::sanitization::{Replacement, SanitizationResult, SanitizationStrategy};

/// Rewrites detected spans according to a [`SanitizationStrategy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer {
    default_strategy: SanitizationStrategy,
}

impl Sanitizer {
    pub fn new(default_strategy: SanitizationStrategy) -> Self {
        Self { default_strategy }
    }

    pub fn default_strategy(&self) -> SanitizationStrategy {
        self.default_strategy
    }

    /// Rewrite every entity span in `document`.
    ///
    /// Spans are spliced in descending `start` order so earlier edits never
    /// shift the offsets of spans still to be processed. Replacements are
    /// reported in ascending order with offsets into the original document.
    ///
    /// Entities whose spans intersect are resolved first: the higher
    /// confidence entity is kept (see [`resolve_overlaps`]). If a dropped
    /// entity covered text no kept entity covers, `fully_sanitized` is false.
    ///
    /// # Panics
    ///
    /// Panics if an entity's `start..end` is not a valid char-boundary range
    /// of `document`.
    pub fn sanitize(
        &self,
        document: &str,
        entities: &[DetectedEntity],
        strategy: Option<SanitizationStrategy>,
    ) -> SanitizationResult {
        if entities.is_empty() {
            return SanitizationResult::unchanged(document);
        }

        let strategy = strategy.unwrap_or(self.default_strategy);
        let (mut kept, dropped) = resolve_overlaps(entities);

        for entity in &dropped {
            tracing::warn!(
                label = %entity.source_label,
                start = entity.start,
                end = entity.end,
                confidence = entity.confidence,
                "Dropping entity overlapping a higher-confidence span"
            );
        }
        let fully_sanitized = dropped.iter().all(|entity| is_covered(entity, &kept));

        // Reverse order so we can replace without offset issues
        kept.sort_by(|a, b| b.start.cmp(&a.start));

        let mut sanitized = document.to_string();
        let mut replacements = Vec::with_capacity(kept.len());

        for entity in &kept {
            let original = &document[entity.start..entity.end];
            let placeholder = match strategy {
                SanitizationStrategy::Replace => {
                    labels::placeholder_for(entity.category, &entity.source_label)
                }
                SanitizationStrategy::Mask => mask_value(original),
                SanitizationStrategy::Redact => String::new(),
            };

            sanitized.replace_range(entity.start..entity.end, &placeholder);
            replacements.push(Replacement {
                original: original.to_string(),
                placeholder,
                label: entity.source_label.clone(),
                start: entity.start,
                end: entity.end,
            });
        }
        replacements.reverse();

        tracing::debug!(
            strategy = %strategy,
            replacements = replacements.len(),
            dropped = dropped.len(),
            fully_sanitized,
            "Sanitized document"
        );

        SanitizationResult {
            sanitized_text: sanitized,
            replacements,
            fully_sanitized,
        }
    }
}

/// Whether the union of `kept` spans covers all of `entity`'s span.
fn is_covered(entity: &DetectedEntity, kept: &[DetectedEntity]) -> bool {
    let mut spans: Vec<(usize, usize)> = kept
        .iter()
        .filter(|k| k.intersects(entity))
        .map(|k| (k.start, k.end))
        .collect();
    spans.sort_unstable();

    let mut cursor = entity.start;
    for (start, end) in spans {
        if start > cursor {
            return false;
        }
        cursor = cursor.max(end);
        if cursor >= entity.end {
            return true;
        }
    }
    cursor >= entity.end
}

/// Partially mask a value while keeping structural hints.
///
/// - up to 3 chars: `***`
/// - emails: local part masked, domain kept (`j***e@example.com`)
/// - anything with a digit: last 4 chars kept (`***-**-4567`)
/// - otherwise: first char kept, plus the last one for values over 4 chars
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 3 {
        return "***".to_string();
    }

    if let Some((local, domain)) = value.split_once('@') {
        let local: Vec<char> = local.chars().collect();
        let masked_local = if local.len() <= 2 {
            "***".to_string()
        } else {
            format!("{}***{}", local[0], local[local.len() - 1])
        };
        return format!("{}@{}", masked_local, domain);
    }

    let first = chars[0];
    let last = chars[chars.len() - 1];

    if chars.iter().any(|c| c.is_ascii_digit()) {
        if chars.len() > 4 {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            return format!("***-**-{}", tail);
        }
        return format!("***{}", last);
    }

    if chars.len() <= 4 {
        format!("{}***", first)
    } else {
        format!("{}***{}", first, last)
    }
}
