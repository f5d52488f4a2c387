//! Typed errors for the prompt guard library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on the failure they care about.

use thiserror::Error;

/// Errors that can occur while configuring or running the guard pipeline.
#[derive(Debug, Error)]
pub enum GuardError {
    /// A pattern source failed to compile. Raised at registration time only.
    #[error("invalid pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration values are out of range or unparseable
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Configuration document could not be parsed
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The external entity source failed
    #[error("entity source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl GuardError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result type alias for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
