//! RICE: reach × impact × confidence / effort.

use prio_core::config::{AnalysisConfig, RiceConfig};
use prio_core::entities::{RISK_SCORE_KEY, Task};
use prio_core::enums::Method;
use prio_core::lookup::TaskLookup;
use prio_core::numeric::{clamp, normalize01};
use serde_json::json;

use super::EFFORT_FLOOR;
use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "RICE_BIN";

#[derive(Debug, Clone, Copy, Default)]
pub struct Rice;

impl ScoringAgent for Rice {
    fn method(&self) -> Method {
        Method::Rice
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.rice;
        let meta = &task.metadata;

        let reach = task
            .reach
            .filter(|r| r.is_finite())
            .or_else(|| meta.number("reach"));
        let reach_norm = reach.map_or(cfg.missing_reach_norm, |r| {
            normalize01(r, cfg.reach_min, cfg.reach_max)
        });

        let (impact, impact_source) = resolve_impact(task, cfg);
        let confidence = resolve_confidence(task, cfg);

        let effort = task.resolved_effort(cfg.use_effort_pert, cfg.default_effort);
        let effort_value = effort.value.max(EFFORT_FLOOR);

        let base_rice = reach_norm * impact * confidence / effort_value;

        let risk_prob = meta.number("risk_prob");
        let risk_impact = meta.number("risk_impact");
        // Explicit probability × impact wins over an annotated risk score.
        let risk_exposure = match (risk_prob, risk_impact) {
            (Some(p), Some(i)) => Some(clamp(p, 0.0, 1.0) * clamp(i, 0.0, 1.0)),
            _ => meta.number(RISK_SCORE_KEY).map(|r| clamp(r, 0.0, 1.0)),
        };
        let risk_factor = match risk_exposure {
            Some(exposure) if cfg.risk_penalty > 0.0 => {
                (1.0 - cfg.risk_penalty * exposure).max(0.0)
            }
            _ => 1.0,
        };

        let scored = Scored::new(base_rice * risk_factor);
        let bucket = cfg.thresholds.bucket(scored.score);
        Ok(scored
            .with_details(json!({
                "reach": reach,
                "reach_norm": reach_norm,
                "impact": impact,
                "impact_source": impact_source,
                "confidence": confidence,
                "effort": effort_value,
                "effort_source": effort.source.as_str(),
                "base_rice": base_rice,
                "risk_prob": risk_prob,
                "risk_impact": risk_impact,
                "risk_exposure": risk_exposure,
                "risk_factor": risk_factor,
            }))
            .with_label(LABEL, bucket.as_str()))
    }
}

/// Impact: explicit `impact_value`, then a named anchor, then the raw field,
/// then the default; always clamped into the configured range.
fn resolve_impact(task: &Task, cfg: &RiceConfig) -> (f64, &'static str) {
    let meta = &task.metadata;
    let anchor = ["impact_level", "impact"]
        .into_iter()
        .filter_map(|key| meta.text(key))
        .find_map(|name| cfg.impact_anchors.get(&name.trim().to_ascii_lowercase()).copied());

    let (raw, source) = if let Some(v) = meta.number("impact_value") {
        (v, "impact_value")
    } else if let Some(v) = anchor {
        (v, "anchor")
    } else if let Some(v) = task.impact.filter(|i| i.is_finite()) {
        (v, "field")
    } else if let Some(v) = meta.number("impact") {
        (v, "metadata")
    } else {
        (cfg.default_impact, "default")
    };
    (clamp(raw, cfg.impact_min, cfg.impact_max), source)
}

/// Confidence in `[0, 1]`; values above 1 are read as percentages.
fn resolve_confidence(task: &Task, cfg: &RiceConfig) -> f64 {
    let raw = task
        .confidence
        .filter(|c| c.is_finite())
        .or_else(|| task.metadata.number("confidence"))
        .unwrap_or(cfg.default_confidence);
    let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
    clamp(scaled, 0.0, 1.0)
}
