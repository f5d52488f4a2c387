//! Reconciling entity lists from independent detectors.

use crate::types::entity::DetectedEntity;

/// Default minimum overlap ratio for two detections to count as duplicates.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

/// Intersection length divided by the length of the shorter span.
///
/// Returns 0.0 when the spans do not intersect or either span is empty.
pub fn overlap_ratio(a: &DetectedEntity, b: &DetectedEntity) -> f64 {
    let overlap = a.intersection_len(b);
    let shorter = a.len().min(b.len());
    if overlap == 0 || shorter == 0 {
        return 0.0;
    }
    overlap as f64 / shorter as f64
}

/// Whether two entities overlap by at least `threshold` of the shorter span.
///
/// A zero-length intersection never counts, whatever the threshold.
pub fn entities_overlap(a: &DetectedEntity, b: &DetectedEntity, threshold: f64) -> bool {
    a.intersects(b) && overlap_ratio(a, b) >= threshold
}

/// Merge two detector outputs into one position-sorted list.
///
/// Every `primary` entity is kept. A `secondary` entity is dropped when it
/// significantly overlaps any primary entity. The result is stably sorted by
/// `start`, so ties keep primary before secondary, then input order.
///
/// If either list is empty the other is returned as-is. Entities in the
/// result may still overlap each other; only secondary-vs-primary duplicates
/// are removed.
pub fn merge(
    primary: Vec<DetectedEntity>,
    secondary: Vec<DetectedEntity>,
    overlap_threshold: f64,
) -> Vec<DetectedEntity> {
    if primary.is_empty() {
        return secondary;
    }
    if secondary.is_empty() {
        return primary;
    }

    let secondary_count = secondary.len();
    let survivors: Vec<DetectedEntity> = secondary
        .into_iter()
        .filter(|candidate| {
            !primary
                .iter()
                .any(|existing| entities_overlap(candidate, existing, overlap_threshold))
        })
        .collect();

    tracing::debug!(
        primary = primary.len(),
        secondary = secondary_count,
        kept = survivors.len(),
        "Merged entity sources"
    );

    let mut merged = primary;
    merged.extend(survivors);
    merged.sort_by_key(|entity| entity.start);
    merged
}

/// Merge any number of sources, most authoritative first.
pub fn merge_all(
    sources: impl IntoIterator<Item = Vec<DetectedEntity>>,
    overlap_threshold: f64,
) -> Vec<DetectedEntity> {
    sources
        .into_iter()
        .fold(Vec::new(), |merged, next| merge(merged, next, overlap_threshold))
}

/// Split entities into a set whose spans do not intersect and the rest.
///
/// Entities are kept greedily by descending confidence; ties go to the
/// longer span, then the earlier start, then input order. Returns
/// `(kept, dropped)`, both in input order.
pub fn resolve_overlaps(entities: &[DetectedEntity]) -> (Vec<DetectedEntity>, Vec<DetectedEntity>) {
    let mut order: Vec<usize> = (0..entities.len()).collect();
    order.sort_by(|&a, &b| {
        let (ea, eb) = (&entities[a], &entities[b]);
        eb.confidence
            .total_cmp(&ea.confidence)
            .then_with(|| eb.len().cmp(&ea.len()))
            .then_with(|| ea.start.cmp(&eb.start))
            .then_with(|| a.cmp(&b))
    });

    let mut keep = vec![false; entities.len()];
    let mut kept_indices: Vec<usize> = Vec::new();
    for idx in order {
        let candidate = &entities[idx];
        if kept_indices.iter().all(|&k| !entities[k].intersects(candidate)) {
            keep[idx] = true;
            kept_indices.push(idx);
        }
    }

    let mut kept = Vec::with_capacity(kept_indices.len());
    let mut dropped = Vec::new();
    for (entity, keep) in entities.iter().zip(keep) {
        if keep {
            kept.push(entity.clone());
        } else {
            dropped.push(entity.clone());
        }
    }
    (kept, dropped)
}
