//! Summary handed to the persistence collaborator.
//!
//! Carries only counts, categories and the verdict, never detected values.

use serde::{Deserialize, Serialize};

use super::risk::RiskLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub risk_level: RiskLevel,
    pub prompt_length: usize,
    pub entity_count: usize,
    /// Distinct category names, sorted
    pub detected_entity_types: Vec<String>,
    pub was_sanitized: bool,
}
