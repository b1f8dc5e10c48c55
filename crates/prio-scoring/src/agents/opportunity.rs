//! Opportunity score: importance minus current satisfaction.

use prio_core::config::AnalysisConfig;
use prio_core::entities::Task;
use prio_core::enums::Method;
use prio_core::lookup::TaskLookup;
use prio_core::numeric::clamp;
use serde_json::json;

use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "OPPORTUNITY_BIN";

#[derive(Debug, Clone, Copy, Default)]
pub struct Opportunity;

impl ScoringAgent for Opportunity {
    fn method(&self) -> Method {
        Method::Opportunity
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.opportunity;
        let importance = task.metadata.number_or("importance", cfg.default_importance);
        let satisfaction = task
            .metadata
            .number_or("satisfaction", cfg.default_satisfaction);

        let scored = Scored::new(clamp(importance - satisfaction, 0.0, cfg.max_score));
        let bucket = cfg.thresholds.bucket(scored.score);
        Ok(scored
            .with_details(json!({
                "importance": importance,
                "satisfaction": satisfaction,
            }))
            .with_label(LABEL, bucket.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_is_clamped() {
        let cfg = AnalysisConfig::default();
        let high = Task::new("t", "p", "x")
            .with_meta("importance", 9)
            .with_meta("satisfaction", "1");
        let s = Opportunity.score(&high, &cfg, None).unwrap();
        assert_eq!(s.score, 8.0);
        assert_eq!(s.labels[LABEL], "HIGH");

        let inverted = Task::new("t", "p", "x").with_meta("satisfaction", 9);
        assert_eq!(Opportunity.score(&inverted, &cfg, None).unwrap().score, 0.0);

        let neutral = Opportunity
            .score(&Task::new("t", "p", "x"), &cfg, None)
            .unwrap();
        assert_eq!(neutral.score, 0.0);
        assert_eq!(neutral.labels[LABEL], "LOW");
    }
}
