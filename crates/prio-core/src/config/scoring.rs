//! Scoring method selection, weights, and per-method sub-configurations.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::BucketThresholds;
use crate::enums::{KanoCategory, Method, MoscowLabel};

fn default_methods() -> Vec<String> {
    ["RICE", "KANO", "MOSCOW", "WSJF"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_weights() -> BTreeMap<String, f64> {
    [("RICE", 1.0), ("KANO", 1.0), ("MOSCOW", 0.7), ("WSJF", 1.0)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Which methods to run, how to weight them, and each method's settings.
///
/// Method names are kept as strings so that configuration files naming an
/// unknown method still load; the orchestrator skips names it cannot resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    pub methods: Vec<String>,
    /// Base weight per method name; missing methods weigh 1.0.
    pub weights: BTreeMap<String, f64>,
    /// Per-method multipliers applied on top of `weights`.
    pub user_overrides: BTreeMap<String, f64>,
    pub rice: RiceConfig,
    pub wsjf: WsjfConfig,
    pub kano: KanoConfig,
    pub moscow: MoscowConfig,
    pub value_effort: ValueEffortConfig,
    pub opportunity: OpportunityConfig,
    pub stack_ranking: StackRankingConfig,
    pub purpose_alignment: PurposeAlignmentConfig,
    pub impact_mapping: ImpactMappingConfig,
    pub cost_of_delay: CostOfDelayConfig,
    pub roi: RoiConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            methods: default_methods(),
            weights: default_weights(),
            user_overrides: BTreeMap::new(),
            rice: RiceConfig::default(),
            wsjf: WsjfConfig::default(),
            kano: KanoConfig::default(),
            moscow: MoscowConfig::default(),
            value_effort: ValueEffortConfig::default(),
            opportunity: OpportunityConfig::default(),
            stack_ranking: StackRankingConfig::default(),
            purpose_alignment: PurposeAlignmentConfig::default(),
            impact_mapping: ImpactMappingConfig::default(),
            cost_of_delay: CostOfDelayConfig::default(),
            roi: RoiConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Config running exactly `methods`, everything else default.
    #[must_use]
    pub fn with_methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Configured base weight; 1.0 when unset.
    #[must_use]
    pub fn weight_for(&self, method: Method) -> f64 {
        lookup_by_method(&self.weights, method).unwrap_or(1.0)
    }

    /// User override multiplier, if any.
    #[must_use]
    pub fn override_for(&self, method: Method) -> Option<f64> {
        lookup_by_method(&self.user_overrides, method)
    }

    /// The sub-configuration a method reads, as JSON (for audit snapshots).
    #[must_use]
    pub fn method_config_json(&self, method: Method) -> serde_json::Value {
        let value = match method {
            Method::Rice => serde_json::to_value(&self.rice),
            Method::Wsjf => serde_json::to_value(&self.wsjf),
            Method::Kano => serde_json::to_value(&self.kano),
            Method::Moscow => serde_json::to_value(&self.moscow),
            Method::ValueEffort => serde_json::to_value(&self.value_effort),
            Method::Opportunity => serde_json::to_value(&self.opportunity),
            Method::StackRanking => serde_json::to_value(&self.stack_ranking),
            Method::PurposeAlignment => serde_json::to_value(&self.purpose_alignment),
            Method::ImpactMapping => serde_json::to_value(&self.impact_mapping),
            Method::CostOfDelay => serde_json::to_value(&self.cost_of_delay),
            Method::Roi => serde_json::to_value(&self.roi),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

/// Weight maps are keyed by free-form names; match them leniently.
fn lookup_by_method(map: &BTreeMap<String, f64>, method: Method) -> Option<f64> {
    map.get(method.as_str()).copied().or_else(|| {
        map.iter()
            .find(|(name, _)| name.parse::<Method>().is_ok_and(|m| m == method))
            .map(|(_, w)| *w)
    })
}

// ---------------------------------------------------------------------------
// RICE
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RiceConfig {
    /// Named impact anchors (Intercom scale).
    pub impact_anchors: BTreeMap<String, f64>,
    pub reach_min: f64,
    pub reach_max: f64,
    /// Normalized reach used when a task carries no reach at all.
    pub missing_reach_norm: f64,
    pub default_impact: f64,
    pub impact_min: f64,
    pub impact_max: f64,
    pub default_confidence: f64,
    pub default_effort: f64,
    pub use_effort_pert: bool,
    /// 0 disables the risk penalty.
    pub risk_penalty: f64,
    pub thresholds: BucketThresholds,
}

impl Default for RiceConfig {
    fn default() -> Self {
        Self {
            impact_anchors: [
                ("tiny", 0.25),
                ("low", 0.5),
                ("medium", 1.0),
                ("high", 2.0),
                ("massive", 3.0),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            reach_min: 0.0,
            reach_max: 10_000.0,
            missing_reach_norm: 0.5,
            default_impact: 1.0,
            impact_min: 0.1,
            impact_max: 3.0,
            default_confidence: 0.8,
            default_effort: 1.0,
            use_effort_pert: true,
            risk_penalty: 0.0,
            thresholds: BucketThresholds::new(0.75, 0.35),
        }
    }
}

// ---------------------------------------------------------------------------
// WSJF
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WsjfConfig {
    /// Component band, usually 1..10.
    pub min_score: f64,
    pub max_score: f64,
    pub weight_bv: f64,
    pub weight_tc: f64,
    pub weight_rr_oe: f64,
    /// Deadline distance at which time criticality bottoms out.
    pub tc_horizon_days: f64,
    pub use_effort_pert: bool,
    pub default_effort: f64,
    pub thresholds: BucketThresholds,
}

impl Default for WsjfConfig {
    fn default() -> Self {
        Self {
            min_score: 1.0,
            max_score: 10.0,
            weight_bv: 1.0,
            weight_tc: 1.0,
            weight_rr_oe: 1.0,
            tc_horizon_days: 60.0,
            use_effort_pert: true,
            default_effort: 1.0,
            thresholds: BucketThresholds::new(1.5, 0.7),
        }
    }
}

// ---------------------------------------------------------------------------
// Kano
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct KanoConfig {
    pub weight_must_be: f64,
    pub weight_performance: f64,
    pub weight_attractive: f64,
    pub weight_indifferent: f64,
    pub weight_reverse: f64,
    pub weight_questionable: f64,
    /// Customer-satisfaction coefficient.
    pub alpha_cs: f64,
    /// Dissatisfaction coefficient.
    pub beta_ds: f64,
    pub default_satisfaction: f64,
    pub default_dissatisfaction: f64,
}

impl Default for KanoConfig {
    fn default() -> Self {
        Self {
            weight_must_be: 0.9,
            weight_performance: 1.0,
            weight_attractive: 1.1,
            weight_indifferent: 0.4,
            weight_reverse: 0.0,
            weight_questionable: 0.2,
            alpha_cs: 0.6,
            beta_ds: 0.4,
            default_satisfaction: 0.5,
            default_dissatisfaction: 0.5,
        }
    }
}

impl KanoConfig {
    #[must_use]
    pub const fn category_weight(&self, category: KanoCategory) -> f64 {
        match category {
            KanoCategory::MustBe => self.weight_must_be,
            KanoCategory::Performance => self.weight_performance,
            KanoCategory::Attractive => self.weight_attractive,
            KanoCategory::Indifferent => self.weight_indifferent,
            KanoCategory::Reverse => self.weight_reverse,
            KanoCategory::Questionable => self.weight_questionable,
        }
    }
}

// ---------------------------------------------------------------------------
// MoSCoW
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MoscowConfig {
    pub base_weights: BTreeMap<String, f64>,
    pub default_label: MoscowLabel,
    pub dependency_boost: f64,
    pub deadline_boost: f64,
    pub capacity_penalty: f64,
    pub deadline_days_threshold: f64,
    pub max_score: f64,
}

impl Default for MoscowConfig {
    fn default() -> Self {
        Self {
            base_weights: [("must", 1.0), ("should", 0.8), ("could", 0.5), ("wont", 0.0)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            default_label: MoscowLabel::Could,
            dependency_boost: 0.1,
            deadline_boost: 0.1,
            capacity_penalty: 0.1,
            deadline_days_threshold: 14.0,
            max_score: 1.2,
        }
    }
}

impl MoscowConfig {
    #[must_use]
    pub fn base_weight(&self, label: MoscowLabel) -> f64 {
        self.base_weights.get(label.as_str()).copied().unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Simple numeric methods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ValueEffortConfig {
    pub default_value: f64,
    pub default_effort: f64,
    pub min_effort: f64,
    pub max_score: f64,
    pub thresholds: BucketThresholds,
}

impl Default for ValueEffortConfig {
    fn default() -> Self {
        Self {
            default_value: 5.0,
            default_effort: 5.0,
            min_effort: 1.0,
            max_score: 10.0,
            thresholds: BucketThresholds::new(7.0, 4.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OpportunityConfig {
    pub default_importance: f64,
    pub default_satisfaction: f64,
    pub max_score: f64,
    pub thresholds: BucketThresholds,
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            default_importance: 5.0,
            default_satisfaction: 5.0,
            max_score: 10.0,
            thresholds: BucketThresholds::new(7.0, 4.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StackRankingConfig {
    pub default_priority: f64,
    /// Divisor mapping votes / priority onto the 0..10 scale.
    pub scale: f64,
    pub thresholds: BucketThresholds,
}

impl Default for StackRankingConfig {
    fn default() -> Self {
        Self {
            default_priority: 50.0,
            scale: 10.0,
            thresholds: BucketThresholds::new(7.0, 4.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Strategic methods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PurposeAlignmentConfig {
    pub goal_weight: f64,
    pub aligned_threshold: f64,
    /// Project goals used when a task carries none in its metadata.
    pub project_goals: BTreeMap<String, f64>,
}

impl Default for PurposeAlignmentConfig {
    fn default() -> Self {
        Self {
            goal_weight: 1.0,
            aligned_threshold: 0.5,
            project_goals: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ImpactMappingConfig {
    /// BFS depth over the dependency graph for indirect impact.
    pub depth: usize,
    pub default_actor_impact: f64,
    pub direct_weight: f64,
    pub indirect_weight: f64,
    /// Per-level discount for indirect contributions.
    pub depth_decay: f64,
    pub broad_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for ImpactMappingConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            default_actor_impact: 0.5,
            direct_weight: 0.7,
            indirect_weight: 0.3,
            depth_decay: 0.5,
            broad_threshold: 0.6,
            medium_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CostOfDelayConfig {
    /// Normalization bounds for `value_per_day * urgency`.
    pub min_cod: f64,
    pub max_cod: f64,
    /// Deadline distance at which urgency reaches zero.
    pub horizon_days: f64,
    /// Urgency when neither a deadline nor an explicit factor is given.
    pub default_urgency: f64,
    pub critical_threshold: f64,
    pub high_threshold: f64,
    pub moderate_threshold: f64,
}

impl Default for CostOfDelayConfig {
    fn default() -> Self {
        Self {
            min_cod: 0.0,
            max_cod: 1000.0,
            horizon_days: 90.0,
            default_urgency: 0.5,
            critical_threshold: 0.75,
            high_threshold: 0.5,
            moderate_threshold: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RoiConfig {
    pub min_roi: f64,
    pub max_roi: f64,
    pub thresholds: BucketThresholds,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            min_roi: -1.0,
            max_roi: 10.0,
            thresholds: BucketThresholds::new(0.75, 0.25),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_weights() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.methods, vec!["RICE", "KANO", "MOSCOW", "WSJF"]);
        assert_eq!(cfg.weight_for(Method::Moscow), 0.7);
        assert_eq!(cfg.weight_for(Method::Roi), 1.0);
        assert_eq!(cfg.override_for(Method::Rice), None);
    }

    #[test]
    fn weight_lookup_tolerates_name_spelling() {
        let mut cfg = AnalysisConfig::default();
        cfg.weights.insert("stack-ranking".into(), 0.3);
        assert_eq!(cfg.weight_for(Method::StackRanking), 0.3);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{"methods":["RICE"],"rice":{"reach_max":500}}"#).unwrap();
        assert_eq!(cfg.methods, vec!["RICE"]);
        assert_eq!(cfg.rice.reach_max, 500.0);
        assert_eq!(cfg.rice.default_effort, 1.0);
        assert_eq!(cfg.wsjf, WsjfConfig::default());
    }

    #[test]
    fn method_config_json_embeds_sub_config() {
        let cfg = AnalysisConfig::default();
        let json = cfg.method_config_json(Method::Moscow);
        assert_eq!(json["deadline_days_threshold"], 14.0);
    }
}
