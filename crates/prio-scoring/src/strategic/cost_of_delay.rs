//! Cost of delay: value lost per day, weighted by urgency.

use prio_core::config::AnalysisConfig;
use prio_core::entities::Task;
use prio_core::enums::{DelayCost, Method};
use prio_core::lookup::TaskLookup;
use prio_core::numeric::{clamp, normalize01};
use serde_json::json;

use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "CoD_BIN";

#[derive(Debug, Clone, Copy, Default)]
pub struct CostOfDelay;

impl ScoringAgent for CostOfDelay {
    fn method(&self) -> Method {
        Method::CostOfDelay
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.cost_of_delay;
        let meta = &task.metadata;

        let value_per_day = meta
            .number("value_per_day")
            .or_else(|| meta.number("value_per_week").map(|w| w / 7.0))
            .unwrap_or(0.0);

        let deadline_days = meta.number("deadline_days");
        let (urgency, urgency_source) = if let Some(factor) = meta.number("urgency_factor") {
            (clamp(factor, 0.0, 1.0), "urgency_factor")
        } else if let Some(days) = deadline_days.filter(|_| cfg.horizon_days > 0.0) {
            (
                1.0 - clamp(days, 0.0, cfg.horizon_days) / cfg.horizon_days,
                "deadline_days",
            )
        } else {
            (cfg.default_urgency, "default")
        };

        let cod_raw = value_per_day * urgency;
        let score = normalize01(cod_raw, cfg.min_cod, cfg.max_cod);
        let level = if score >= cfg.critical_threshold {
            DelayCost::Critical
        } else if score >= cfg.high_threshold {
            DelayCost::High
        } else if score >= cfg.moderate_threshold {
            DelayCost::Moderate
        } else {
            DelayCost::Low
        };

        Ok(Scored::new(score)
            .with_details(json!({
                "value_per_day": value_per_day,
                "deadline_days": deadline_days,
                "urgency": urgency,
                "urgency_source": urgency_source,
                "cod_raw": cod_raw,
                "bounds": [cfg.min_cod, cfg.max_cod],
            }))
            .with_label(LABEL, level.as_str()))
    }
}
