//! Entity source trait for ML-backed detectors.
//!
//! The guard never runs a model itself. Applications wrap their model
//! (a local NER model, a hosted endpoint, ...) in an `EntitySource` and the
//! pipeline treats its output as authoritative.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::entity::DetectedEntity;

/// Detector producing entities over a document.
///
/// Implementations must report byte offsets into `document`. Offsets and
/// confidences are trusted as-is; `value` is expected to equal the covered
/// slice but is not re-checked.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Detect entities for the requested labels with at least `threshold`
    /// confidence.
    async fn predict(
        &self,
        document: &str,
        labels: &[String],
        threshold: f64,
    ) -> Result<Vec<DetectedEntity>>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "entity-source"
    }
}
