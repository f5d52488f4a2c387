//! Testing utilities including mock implementations.
//!
//! Useful for testing applications that use the guard without running a
//! real ML model.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{GuardError, Result};
use crate::traits::EntitySource;
use crate::types::entity::DetectedEntity;

/// A mock entity source for testing.
///
/// Returns predefined entities per document and records every call.
/// Documents without predefined entities yield an empty list.
#[derive(Default)]
pub struct MockEntitySource {
    /// Predefined entities by document
    responses: Arc<RwLock<HashMap<String, Vec<DetectedEntity>>>>,

    /// Error message returned for every call when set
    failure: Option<String>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockSourceCall>>>,
}

/// Record of a call made to the mock source.
#[derive(Debug, Clone, PartialEq)]
pub struct MockSourceCall {
    pub document_len: usize,
    pub labels: Vec<String>,
    pub threshold: f64,
}

impl MockEntitySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add predefined entities for a document.
    pub fn with_entities(self, document: impl Into<String>, entities: Vec<DetectedEntity>) -> Self {
        self.responses.write().unwrap().insert(document.into(), entities);
        self
    }

    /// Fail every call with the given message.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockSourceCall> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl EntitySource for MockEntitySource {
    async fn predict(
        &self,
        document: &str,
        labels: &[String],
        threshold: f64,
    ) -> Result<Vec<DetectedEntity>> {
        self.calls.write().unwrap().push(MockSourceCall {
            document_len: document.len(),
            labels: labels.to_vec(),
            threshold,
        });

        if let Some(message) = &self.failure {
            return Err(GuardError::Source(message.clone().into()));
        }

        let entities = self
            .responses
            .read()
            .unwrap()
            .get(document)
            .cloned()
            .unwrap_or_default();

        Ok(entities
            .into_iter()
            .filter(|entity| entity.confidence >= threshold)
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
