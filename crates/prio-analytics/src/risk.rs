//! Delivery risk from explicit probability/impact, failure history and
//! dependency fan-out.

use prio_core::config::RiskConfig;
use prio_core::entities::{Details, Labels, Task};
use prio_core::enums::RiskLevel;
use prio_core::numeric::clamp;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const LABEL: &str = "RISK_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Combined risk in `[0, 1]`.
    pub score: f64,
    pub level: RiskLevel,
    pub base_risk: f64,
    pub details: Details,
}

impl RiskReport {
    #[must_use]
    pub fn labels(&self) -> Labels {
        Labels::from([(LABEL.to_string(), self.level.as_str().to_string())])
    }
}

#[must_use]
pub fn level_for(score: f64, cfg: &RiskConfig) -> RiskLevel {
    if score >= cfg.critical_threshold {
        RiskLevel::Critical
    } else if score >= cfg.high_threshold {
        RiskLevel::High
    } else if score >= cfg.medium_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Score the risk of one task.
///
/// `base_risk` is `risk_prob * risk_impact` when both are present, otherwise
/// a proxy from `historical_failures` and the dependency count.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze(task: &Task, cfg: &RiskConfig) -> RiskReport {
    let meta = &task.metadata;
    let failures = meta.number_or("historical_failures", 0.0).max(0.0);
    let dependencies = meta
        .number("dependency_count")
        .unwrap_or(task.dependencies.len() as f64)
        .max(0.0);

    let (base_risk, source) = match (meta.number("risk_prob"), meta.number("risk_impact")) {
        (Some(prob), Some(impact)) => (clamp(prob * impact, 0.0, 1.0), "explicit"),
        _ => (
            clamp(
                failures.mul_add(
                    cfg.proxy_failure_coefficient,
                    dependencies * cfg.proxy_dependency_coefficient,
                ),
                0.0,
                1.0,
            ),
            "proxy",
        ),
    };

    let failure_factor = saturate(failures, cfg.failure_saturation);
    let dependency_factor = saturate(dependencies, cfg.dependency_saturation);
    let score = clamp(
        cfg.failure_weight * failure_factor
            + cfg.dependency_weight * dependency_factor
            + cfg.base_weight * base_risk,
        0.0,
        1.0,
    );
    let level = level_for(score, cfg);

    let mut details = Details::new();
    details.insert("historical_failures".into(), json!(failures));
    details.insert("dependency_count".into(), json!(dependencies));
    details.insert("failure_factor".into(), json!(failure_factor));
    details.insert("dependency_factor".into(), json!(dependency_factor));
    details.insert("base_risk".into(), json!(base_risk));
    details.insert("base_source".into(), json!(source));

    RiskReport {
        score,
        level,
        base_risk,
        details,
    }
}

/// `min(1, count / saturation)`; a non-positive saturation saturates at once.
fn saturate(count: f64, saturation: f64) -> f64 {
    if saturation > 0.0 {
        (count / saturation).min(1.0)
    } else if count > 0.0 {
        1.0
    } else {
        0.0
    }
}
