//! Stack ranking from stakeholder votes or a priority field.

use prio_core::config::AnalysisConfig;
use prio_core::entities::Task;
use prio_core::enums::Method;
use prio_core::lookup::TaskLookup;
use prio_core::numeric::mean;
use serde_json::json;

use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "STACK_RANK_BIN";

#[derive(Debug, Clone, Copy, Default)]
pub struct StackRanking;

impl ScoringAgent for StackRanking {
    fn method(&self) -> Method {
        Method::StackRanking
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.stack_ranking;
        let votes = task.metadata.number_list("votes");
        let scale = if cfg.scale > 0.0 { cfg.scale } else { 1.0 };

        let (raw, source) = match mean(&votes) {
            Some(avg) => (avg, "votes"),
            None => (
                task.metadata.number_or("priority", cfg.default_priority),
                "priority",
            ),
        };

        let scored = Scored::new(raw / scale);
        let bucket = cfg.thresholds.bucket(scored.score);
        Ok(scored
            .with_details(json!({
                "source": source,
                "votes": votes,
                "raw": raw,
                "scale": scale,
            }))
            .with_label(LABEL, bucket.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn votes_win_over_priority() {
        let task = Task::new("t", "p", "x")
            .with_meta("votes", "80, 90,100")
            .with_meta("priority", 10);
        let s = StackRanking
            .score(&task, &AnalysisConfig::default(), None)
            .unwrap();
        assert_eq!(s.score, 9.0);
        assert_eq!(s.details["source"], "votes");
        assert_eq!(s.labels[LABEL], "HIGH");
    }

    #[test]
    fn priority_default_is_fifty() {
        let s = StackRanking
            .score(&Task::new("t", "p", "x"), &AnalysisConfig::default(), None)
            .unwrap();
        assert_eq!(s.score, 5.0);
        assert_eq!(s.labels[LABEL], "MEDIUM");
    }
}
