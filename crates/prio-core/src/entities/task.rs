use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metadata::Metadata;
use crate::numeric::pert_mean;

/// Metadata keys that analytics annotation writes back onto a task.
pub const FORECAST_EFFORT_KEY: &str = "forecast_effort";
pub const FORECAST_SOURCE_KEY: &str = "forecast_source";
pub const RISK_SCORE_KEY: &str = "risk_score";
pub const DEPENDENCY_LABEL_KEY: &str = "dependency_label";

/// Forecast source that only echoes a default and is never reused as effort.
const FALLBACK_SOURCE: &str = "FALLBACK";

/// A backlog work item to be scored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Story points or person-days.
    #[serde(default)]
    pub effort: Option<f64>,
    #[serde(default)]
    pub reach: Option<f64>,
    #[serde(default)]
    pub impact: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Ids of tasks this task depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Task {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            title: title.into(),
            description: None,
            tags: Vec::new(),
            effort: None,
            reach: None,
            impact: None,
            confidence: None,
            dependencies: Vec::new(),
            created_at: Utc::now(),
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_effort(mut self, effort: f64) -> Self {
        self.effort = Some(effort);
        self
    }

    #[must_use]
    pub fn with_reach(mut self, reach: f64) -> Self {
        self.reach = Some(reach);
        self
    }

    #[must_use]
    pub fn with_impact(mut self, impact: f64) -> Self {
        self.impact = Some(impact);
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Effort by the shared PERT-or-raw rule.
    ///
    /// Order: PERT mean of `effort_o/_m/_p` (when `use_pert`), the `effort`
    /// field, metadata `effort`, an annotated `forecast_effort` whose
    /// `forecast_source` is not `FALLBACK`, then `default`.
    #[must_use]
    pub fn resolved_effort(&self, use_pert: bool, default: f64) -> EffortEstimate {
        if use_pert {
            if let Some((o, m, p)) = self.metadata.pert_triplet("effort") {
                let value = pert_mean(o, m, p);
                if value.is_finite() {
                    return EffortEstimate {
                        value,
                        source: EffortSource::Pert,
                    };
                }
            }
        }
        if let Some(value) = self.effort.filter(|e| e.is_finite()) {
            return EffortEstimate {
                value,
                source: EffortSource::Field,
            };
        }
        if let Some(value) = self.metadata.number("effort") {
            return EffortEstimate {
                value,
                source: EffortSource::Metadata,
            };
        }
        let fallback_forecast = self
            .metadata
            .text(FORECAST_SOURCE_KEY)
            .is_some_and(|source| source.eq_ignore_ascii_case(FALLBACK_SOURCE));
        let forecast = self
            .metadata
            .number(FORECAST_EFFORT_KEY)
            .filter(|v| *v >= 0.0 && !fallback_forecast);
        if let Some(value) = forecast {
            return EffortEstimate {
                value,
                source: EffortSource::Forecast,
            };
        }
        EffortEstimate {
            value: default,
            source: EffortSource::Default,
        }
    }
}

/// Resolved effort plus where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffortEstimate {
    pub value: f64,
    pub source: EffortSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EffortSource {
    Pert,
    Field,
    Metadata,
    Forecast,
    Default,
}

impl EffortSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pert => "pert",
            Self::Field => "field",
            Self::Metadata => "metadata",
            Self::Forecast => "forecast",
            Self::Default => "default",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_effort_prefers_pert_then_field_then_metadata() {
        let task = Task::new("t1", "p", "x")
            .with_effort(8.0)
            .with_meta("effort_o", 1)
            .with_meta("effort_m", 2)
            .with_meta("effort_p", 3);
        let pert = task.resolved_effort(true, 1.0);
        assert_eq!(pert.value, 2.0);
        assert_eq!(pert.source, EffortSource::Pert);

        let raw = task.resolved_effort(false, 1.0);
        assert_eq!(raw.value, 8.0);
        assert_eq!(raw.source, EffortSource::Field);

        let meta_only = Task::new("t2", "p", "x").with_meta("effort", "3.5");
        assert_eq!(meta_only.resolved_effort(true, 1.0).value, 3.5);

        let bare = Task::new("t3", "p", "x");
        let fallback = bare.resolved_effort(true, 4.0);
        assert_eq!(fallback.value, 4.0);
        assert_eq!(fallback.source, EffortSource::Default);
    }

    #[test]
    fn annotated_forecast_fills_in_missing_effort() {
        let forecast = Task::new("t1", "p", "x")
            .with_meta(FORECAST_EFFORT_KEY, 6.5)
            .with_meta(FORECAST_SOURCE_KEY, "HISTORY");
        let estimate = forecast.resolved_effort(true, 1.0);
        assert_eq!(estimate.value, 6.5);
        assert_eq!(estimate.source, EffortSource::Forecast);

        let explicit = forecast.clone().with_effort(2.0);
        assert_eq!(explicit.resolved_effort(true, 1.0).source, EffortSource::Field);

        let echoed_default = Task::new("t2", "p", "x")
            .with_meta(FORECAST_EFFORT_KEY, 5.0)
            .with_meta(FORECAST_SOURCE_KEY, "FALLBACK");
        assert_eq!(
            echoed_default.resolved_effort(true, 1.0).source,
            EffortSource::Default
        );
    }

    #[test]
    fn task_deserializes_with_minimal_fields() {
        let task: Task =
            serde_json::from_str(r#"{"id":"a","project_id":"p","title":"t"}"#).unwrap();
        assert!(task.dependencies.is_empty());
        assert!(task.metadata.is_empty());
        assert_eq!(task.effort, None);
    }
}
