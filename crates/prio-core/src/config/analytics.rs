//! Settings for the analytics agents (trend, risk, dependency, effort,
//! forensic) and the summary the aggregator derives from them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub trend: TrendConfig,
    pub risk: RiskConfig,
    pub dependency: DependencyConfig,
    pub effort: EffortForecastConfig,
    pub forensic: ForensicConfig,
    pub summary: SummaryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TrendConfig {
    /// Fewer points yield a FLAT trend with score 0.
    pub min_points: usize,
    /// Let OLS, Holt and AR(1) compete on AIC once enough points exist.
    pub use_models: bool,
    pub model_min_points: usize,
    pub use_ar: bool,
    pub ar_min_points: usize,
    /// Days of slope compared against mean |y| when computing strength.
    pub strength_horizon_days: f64,
    /// Longest series considered; older points are dropped.
    pub max_series_len: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_points: 3,
            use_models: true,
            model_min_points: 6,
            use_ar: true,
            ar_min_points: 10,
            strength_horizon_days: 30.0,
            max_series_len: 365,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RiskConfig {
    pub failure_weight: f64,
    pub dependency_weight: f64,
    pub base_weight: f64,
    /// Failure count at which the failure factor saturates.
    pub failure_saturation: f64,
    pub dependency_saturation: f64,
    /// Coefficients of the base-risk proxy used without `risk_prob`/`risk_impact`.
    pub proxy_failure_coefficient: f64,
    pub proxy_dependency_coefficient: f64,
    pub critical_threshold: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            failure_weight: 0.3,
            dependency_weight: 0.2,
            base_weight: 0.5,
            failure_saturation: 5.0,
            dependency_saturation: 10.0,
            proxy_failure_coefficient: 0.1,
            proxy_dependency_coefficient: 0.05,
            critical_threshold: 0.75,
            high_threshold: 0.5,
            medium_threshold: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DependencyConfig {
    pub max_depth: usize,
    /// Node count above which an acyclic graph is COMPLEX.
    pub complex_threshold: usize,
    pub node_scale: f64,
    pub effort_scale: f64,
    pub use_effort_pert: bool,
    /// Effort of nodes with no estimate.
    pub default_effort: f64,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            complex_threshold: 5,
            node_scale: 20.0,
            effort_scale: 100.0,
            use_effort_pert: true,
            default_effort: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EffortForecastConfig {
    pub min_points: usize,
    /// Points of history averaged by the moving-average forecast.
    pub ma_window: usize,
    pub use_models: bool,
    pub model_min_points: usize,
    pub use_ar: bool,
    pub ar_min_points: usize,
    pub forecast_periods: usize,
    /// Two-sided significance of the reported prediction interval.
    pub alpha: f64,
    pub default_effort: f64,
    pub max_series_len: usize,
}

impl Default for EffortForecastConfig {
    fn default() -> Self {
        Self {
            min_points: 3,
            ma_window: 3,
            use_models: true,
            model_min_points: 6,
            use_ar: false,
            ar_min_points: 10,
            forecast_periods: 1,
            alpha: 0.05,
            default_effort: 1.0,
            max_series_len: 365,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ForensicConfig {
    /// Overrun ratio above which an entry counts as underestimated.
    pub delay_threshold_ratio: f64,
    pub top_blockers: usize,
    pub underestimate_weight: f64,
    pub recurrence_weight: f64,
    pub resource_weight: f64,
    pub underestimate_alert: f64,
    pub recurrence_alert: f64,
    pub resource_alert: f64,
    pub critical_threshold: f64,
    pub high_threshold: f64,
}

impl Default for ForensicConfig {
    fn default() -> Self {
        Self {
            delay_threshold_ratio: 0.2,
            top_blockers: 5,
            underestimate_weight: 0.6,
            recurrence_weight: 0.2,
            resource_weight: 0.2,
            underestimate_alert: 0.2,
            recurrence_alert: 0.1,
            resource_alert: 0.1,
            critical_threshold: 0.7,
            high_threshold: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SummaryConfig {
    /// Risk above which the summary recommends escalation.
    pub escalate_risk: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            escalate_risk: 0.75,
        }
    }
}
