//! Value versus effort ratio on a 0..10 scale.

use prio_core::config::AnalysisConfig;
use prio_core::entities::Task;
use prio_core::enums::Method;
use prio_core::lookup::TaskLookup;
use serde_json::json;

use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "VALUE_EFFORT_BIN";

#[derive(Debug, Clone, Copy, Default)]
pub struct ValueEffort;

impl ScoringAgent for ValueEffort {
    fn method(&self) -> Method {
        Method::ValueEffort
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.value_effort;
        let value = task.metadata.number_or("value", cfg.default_value);
        let effort = task
            .effort
            .filter(|e| e.is_finite())
            .or_else(|| task.metadata.number("effort"))
            .unwrap_or(cfg.default_effort);
        let effort_used = effort.max(cfg.min_effort);

        let scored = Scored::new((2.0 * value / effort_used).min(cfg.max_score));
        let bucket = cfg.thresholds.bucket(scored.score);
        Ok(scored
            .with_details(json!({
                "value": value,
                "effort": effort,
                "effort_used": effort_used,
            }))
            .with_label(LABEL, bucket.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 2.0, "LOW")]
    #[case(Some(9.0), Some(2.0), 9.0, "HIGH")]
    #[case(Some(10.0), Some(0.5), 10.0, "HIGH")]
    #[case(Some(5.0), Some(2.0), 5.0, "MEDIUM")]
    fn ratio_and_bucket(
        #[case] value: Option<f64>,
        #[case] effort: Option<f64>,
        #[case] expected: f64,
        #[case] bucket: &str,
    ) {
        let mut task = Task::new("t", "p", "x");
        if let Some(v) = value {
            task.metadata.insert("value", v);
        }
        task.effort = effort;
        let s = ValueEffort
            .score(&task, &AnalysisConfig::default(), None)
            .unwrap();
        assert!((s.score - expected).abs() < 1e-12);
        assert_eq!(s.labels[LABEL], bucket);
    }
}
