//! Return on investment normalized onto a fixed band.

use prio_core::config::AnalysisConfig;
use prio_core::entities::Task;
use prio_core::enums::Method;
use prio_core::lookup::TaskLookup;
use prio_core::numeric::normalize01;
use serde_json::json;

use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "ROI_BIN";

#[derive(Debug, Clone, Copy, Default)]
pub struct Roi;

impl ScoringAgent for Roi {
    fn method(&self) -> Method {
        Method::Roi
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.roi;
        let expected_gain = task.metadata.number_or("expected_gain", 0.0);
        let cost = task.metadata.number_or("cost", 0.0);
        let roi_raw = if cost > 0.0 {
            (expected_gain - cost) / cost
        } else {
            0.0
        };

        let scored = Scored::new(normalize01(roi_raw, cfg.min_roi, cfg.max_roi));
        let bucket = cfg.thresholds.bucket(scored.score);
        Ok(scored
            .with_details(json!({
                "expected_gain": expected_gain,
                "cost": cost,
                "roi_raw": roi_raw,
                "band": [cfg.min_roi, cfg.max_roi],
            }))
            .with_label(LABEL, bucket.as_str()))
    }
}
