//! WSJF: (BV + TC + RR/OE) / job size.
//!
//! Components live on a band (1..10 by default). Explicit metadata values
//! above the band are read as 0..100 and rescaled; otherwise proxies are
//! derived from `value`, `deadline_days` and the risk/opportunity flags.

use prio_core::config::{AnalysisConfig, WsjfConfig};
use prio_core::entities::Task;
use prio_core::enums::Method;
use prio_core::lookup::TaskLookup;
use prio_core::metadata::Metadata;
use prio_core::numeric::{clamp, scale_to_band};
use serde_json::json;

use super::{EFFORT_FLOOR, flag_value};
use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "WSJF_BIN";

#[derive(Debug, Clone, Copy, Default)]
pub struct Wsjf;

impl ScoringAgent for Wsjf {
    fn method(&self) -> Method {
        Method::Wsjf
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.wsjf;
        let bv = business_value(task, cfg);
        let tc = time_criticality(&task.metadata, cfg);
        let rr_oe = risk_reduction(&task.metadata, cfg);

        let effort = task.resolved_effort(cfg.use_effort_pert, cfg.default_effort);
        let job_size = effort.value.max(EFFORT_FLOOR);

        let bv_weighted = cfg.weight_bv * bv;
        let tc_weighted = cfg.weight_tc * tc;
        let rr_oe_weighted = cfg.weight_rr_oe * rr_oe;
        let numerator = bv_weighted + tc_weighted + rr_oe_weighted;

        let scored = Scored::new(numerator / job_size);
        let bucket = cfg.thresholds.bucket(scored.score);
        Ok(scored
            .with_details(json!({
                "BV": bv,
                "TC": tc,
                "RR_OE": rr_oe,
                "BV_weighted": bv_weighted,
                "TC_weighted": tc_weighted,
                "RR_OE_weighted": rr_oe_weighted,
                "job_size": job_size,
                "job_size_source": effort.source.as_str(),
                "numerator": numerator,
            }))
            .with_label(LABEL, bucket.as_str()))
    }
}

fn band(cfg: &WsjfConfig, x: f64, lo: f64, hi: f64) -> f64 {
    clamp(
        scale_to_band(x, lo, hi, cfg.min_score, cfg.max_score),
        cfg.min_score,
        cfg.max_score,
    )
}

/// Explicit component value, rescaled from 0..100 when it exceeds the band.
fn explicit(meta: &Metadata, key: &str, cfg: &WsjfConfig) -> Option<f64> {
    let v = meta.number(key)?;
    Some(if v > cfg.max_score {
        band(cfg, v, 0.0, 100.0)
    } else {
        clamp(v, cfg.min_score, cfg.max_score)
    })
}

fn business_value(task: &Task, cfg: &WsjfConfig) -> f64 {
    if let Some(bv) = explicit(&task.metadata, "bv", cfg) {
        return bv;
    }
    // Proxy: value (or impact) on the 0..3 impact scale.
    let value = if task.metadata.contains("value") {
        task.metadata.number_or("value", 1.0)
    } else {
        task.impact.filter(|i| i.is_finite()).unwrap_or(1.0)
    };
    band(cfg, value, 0.0, 3.0)
}

fn time_criticality(meta: &Metadata, cfg: &WsjfConfig) -> f64 {
    if let Some(tc) = explicit(meta, "tc", cfg) {
        return tc;
    }
    match meta.number("deadline_days") {
        // No deadline: middle of the band.
        None => f64::midpoint(cfg.min_score, cfg.max_score),
        Some(days) => {
            let tc_raw = (cfg.tc_horizon_days - days).max(0.0);
            band(cfg, tc_raw, 0.0, cfg.tc_horizon_days)
        }
    }
}

fn risk_reduction(meta: &Metadata, cfg: &WsjfConfig) -> f64 {
    if let Some(rr) = explicit(meta, "rr_oe", cfg) {
        return rr;
    }
    let rr_raw = clamp(
        flag_value(meta, "risk_reduction_flag")
            .mul_add(0.6, flag_value(meta, "opportunity_flag") * 0.4),
        0.0,
        1.0,
    );
    band(cfg, rr_raw, 0.0, 1.0)
}
