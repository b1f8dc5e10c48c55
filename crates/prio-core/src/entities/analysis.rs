use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::enums::Method;

/// Audit trail of every intermediate quantity a method computed.
pub type Details = serde_json::Map<String, serde_json::Value>;

/// Categorical tags keyed by label family (`RICE_BIN`, `KANO`, ...).
pub type Labels = BTreeMap<String, String>;

/// One method's score for one task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MethodScore {
    pub method: Method,
    /// Raw (un-normalized) score; always finite.
    pub score: f64,
    #[serde(default)]
    pub details: Details,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
}

/// All method scores for one task plus the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TaskAnalysis {
    pub task_id: String,
    pub method_scores: Vec<MethodScore>,
    /// Weighted aggregate; absent when no method succeeded.
    pub combined_score: Option<f64>,
    #[serde(default)]
    pub labels: Labels,
    /// Error message per failed method.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

/// Project-level analysis artifact handed to the repository.
///
/// `config_used` is the exact configuration the run used, kept for
/// reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AnalysisResult {
    pub project_id: String,
    pub tasks: Vec<TaskAnalysis>,
    pub created_at: DateTime<Utc>,
    pub config_used: AnalysisConfig,
}

impl AnalysisResult {
    /// Analysis for a given task id, if present.
    #[must_use]
    pub fn task(&self, task_id: &str) -> Option<&TaskAnalysis> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }
}
