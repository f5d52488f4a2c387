//! Risk verdict types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete risk verdict, ordered `Green < Amber < Red`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No sensitive data detected
    Green,
    /// Low to medium sensitivity
    Amber,
    /// High sensitivity
    Red,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Amber => "amber",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring a merged entity list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub level: RiskLevel,
    pub entity_count: usize,
    pub high_confidence_count: usize,
    pub max_confidence: f64,
    pub reasoning: String,
}
