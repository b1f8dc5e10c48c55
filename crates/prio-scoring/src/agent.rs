//! The scoring method contract.

use prio_core::config::AnalysisConfig;
use prio_core::entities::{Details, Labels, Task};
use prio_core::enums::Method;
use prio_core::lookup::TaskLookup;
use prio_core::numeric::sanitize;
use serde_json::Value;

use crate::error::ScoringError;

/// One scoring method.
///
/// Implementations substitute documented defaults for missing or malformed
/// inputs instead of failing. The only side effect allowed is a read through
/// `lookup`, which strategic agents use to walk dependencies.
pub trait ScoringAgent: Send + Sync {
    fn method(&self) -> Method;

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError>;
}

/// Raw score, audit details, and categorical labels produced by an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub score: f64,
    pub details: Details,
    pub labels: Labels,
}

impl Scored {
    /// Wrap a score; non-finite values become `0.0`.
    #[must_use]
    pub fn new(score: f64) -> Self {
        Self {
            score: sanitize(score),
            details: Details::new(),
            labels: Labels::new(),
        }
    }

    /// Merge a JSON object into the details; non-objects are ignored.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        if let Value::Object(map) = details {
            self.details.extend(map);
        }
        self
    }

    #[must_use]
    pub fn with_label(mut self, key: &str, value: impl Into<String>) -> Self {
        self.labels.insert(key.to_string(), value.into());
        self
    }
}
