//! Per-call configuration types.
//!
//! [`AnalysisConfig`] selects and weights scoring methods and carries every
//! method's sub-configuration. [`AnalyticsConfig`] carries the analytics
//! agents' settings. Both are plain data supplied with each call; the engine
//! holds no global configuration. Every numeric bucket threshold lives here as
//! a configurable default.

mod analytics;
mod scoring;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Bucket;

pub use analytics::{
    AnalyticsConfig, DependencyConfig, EffortForecastConfig, ForensicConfig, RiskConfig,
    SummaryConfig, TrendConfig,
};
pub use scoring::{
    AnalysisConfig, CostOfDelayConfig, ImpactMappingConfig, KanoConfig, MoscowConfig,
    OpportunityConfig, PurposeAlignmentConfig, RiceConfig, RoiConfig, StackRankingConfig,
    ValueEffortConfig, WsjfConfig,
};

/// HIGH / MEDIUM cut-offs; anything below `medium` is LOW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BucketThresholds {
    pub high: f64,
    pub medium: f64,
}

impl BucketThresholds {
    #[must_use]
    pub const fn new(high: f64, medium: f64) -> Self {
        Self { high, medium }
    }

    #[must_use]
    pub fn bucket(&self, score: f64) -> Bucket {
        if score >= self.high {
            Bucket::High
        } else if score >= self.medium {
            Bucket::Medium
        } else {
            Bucket::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries_are_inclusive() {
        let t = BucketThresholds::new(0.75, 0.35);
        assert_eq!(t.bucket(0.75), Bucket::High);
        assert_eq!(t.bucket(0.7499), Bucket::Medium);
        assert_eq!(t.bucket(0.35), Bucket::Medium);
        assert_eq!(t.bucket(0.0), Bucket::Low);
    }
}
