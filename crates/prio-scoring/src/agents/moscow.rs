//! MoSCoW label with dependency, deadline and capacity adjustments.

use prio_core::config::AnalysisConfig;
use prio_core::entities::Task;
use prio_core::enums::{Method, MoscowLabel};
use prio_core::lookup::TaskLookup;
use prio_core::numeric::clamp;
use serde_json::json;

use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "MOSCOW";

#[derive(Debug, Clone, Copy, Default)]
pub struct Moscow;

impl ScoringAgent for Moscow {
    fn method(&self) -> Method {
        Method::Moscow
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.moscow;
        let meta = &task.metadata;

        let label = meta
            .text("moscow")
            .and_then(MoscowLabel::parse_lenient)
            .unwrap_or(cfg.default_label);
        let base = cfg.base_weight(label);

        let dep_boost = if meta.flag("critical_dependency") {
            cfg.dependency_boost
        } else {
            0.0
        };
        let deadline_days = meta.number("deadline_days");
        let deadline_boost = match deadline_days {
            Some(days) if days <= cfg.deadline_days_threshold => cfg.deadline_boost,
            _ => 0.0,
        };
        let capacity_penalty = if meta.flag("sprint_capacity_deficit") {
            cfg.capacity_penalty
        } else {
            0.0
        };

        let score = clamp(
            base + dep_boost + deadline_boost - capacity_penalty,
            0.0,
            cfg.max_score,
        );

        Ok(Scored::new(score)
            .with_details(json!({
                "label": label.as_str(),
                "base": base,
                "dep_boost": dep_boost,
                "deadline_days": deadline_days,
                "deadline_boost": deadline_boost,
                "capacity_penalty": capacity_penalty,
            }))
            .with_label(LABEL, label.as_str()))
    }
}
