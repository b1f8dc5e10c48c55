//! Impact mapping: direct actor impact plus impact inherited through
//! dependencies.

use std::collections::{HashSet, VecDeque};

use prio_core::config::{AnalysisConfig, ImpactMappingConfig};
use prio_core::entities::Task;
use prio_core::enums::{ImpactBreadth, Method};
use prio_core::lookup::TaskLookup;
use prio_core::metadata::parse_number;
use prio_core::numeric::clamp;
use serde_json::{Value, json};

use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "IMPACT_BIN";

#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactMapping;

impl ScoringAgent for ImpactMapping {
    fn method(&self) -> Method {
        Method::ImpactMapping
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.impact_mapping;
        let targets = task.metadata.decoded("impact_targets");
        let (direct, actors) = direct_impact(targets.as_ref(), cfg);
        let (indirect, indirect_details) = match lookup {
            Some(lookup) => indirect_impact(task, lookup, cfg),
            None => (0.0, json!({ "indirect": "no_lookup" })),
        };

        let score = clamp(
            cfg.direct_weight
                .mul_add(direct, cfg.indirect_weight * indirect),
            0.0,
            1.0,
        );
        let breadth = if score >= cfg.broad_threshold {
            ImpactBreadth::Broad
        } else if score >= cfg.medium_threshold {
            ImpactBreadth::Medium
        } else {
            ImpactBreadth::Narrow
        };

        Ok(Scored::new(score)
            .with_details(json!({
                "direct": { "score": direct, "actors": actors },
                "indirect": { "score": indirect, "details": indirect_details },
                "w_direct": cfg.direct_weight,
                "w_indirect": cfg.indirect_weight,
            }))
            .with_label(LABEL, breadth.as_str()))
    }
}

/// Mean actor impact. Targets are names (default impact) or
/// `{actor, impact}` objects.
fn direct_impact(targets: Option<&Value>, cfg: &ImpactMappingConfig) -> (f64, Vec<Value>) {
    let items: &[Value] = match targets {
        Some(Value::Array(items)) => items,
        _ => &[],
    };
    let mut actors = Vec::with_capacity(items.len());
    let mut total = 0.0;
    for item in items {
        let (actor, impact) = match item {
            Value::Object(obj) => (
                obj.get("actor").cloned().unwrap_or(Value::Null),
                obj.get("impact")
                    .and_then(parse_number)
                    .unwrap_or(cfg.default_actor_impact),
            ),
            Value::String(name) => (json!(name), cfg.default_actor_impact),
            other => (json!(other.to_string()), cfg.default_actor_impact),
        };
        total += impact;
        actors.push(json!({ "actor": actor, "impact": impact }));
    }
    #[allow(clippy::cast_precision_loss)]
    let direct = total / actors.len().max(1) as f64;
    (clamp(direct, 0.0, 1.0), actors)
}

/// Breadth-first walk over dependencies, each resolved node contributing
/// its `impact_estimate` discounted by `depth_decay^level`.
fn indirect_impact(task: &Task, lookup: &dyn TaskLookup, cfg: &ImpactMappingConfig) -> (f64, Value) {
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, usize)> =
        task.dependencies.iter().map(|d| (d.clone(), 0)).collect();
    let mut contributions = Vec::new();
    let mut total = 0.0;

    while let Some((id, level)) = queue.pop_front() {
        if level >= cfg.depth || !visited.insert(id.clone()) {
            continue;
        }
        let Some(dep) = lookup.lookup(&id) else {
            tracing::trace!(task_id = %id, "impact mapping: dependency not found");
            continue;
        };
        let contrib = dep.metadata.number_or("impact_estimate", 0.0);
        let discount = cfg.depth_decay.powi(i32::try_from(level).unwrap_or(i32::MAX));
        total += contrib * discount;
        contributions.push(json!({ "task_id": id, "level": level, "contrib": contrib }));
        queue.extend(
            dep.dependencies
                .iter()
                .filter(|d| !visited.contains(*d))
                .map(|d| (d.clone(), level + 1)),
        );
    }

    (
        clamp(total, 0.0, 1.0),
        json!({ "indirect_contributions": contributions }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use prio_core::lookup::TaskIndex;

    #[test]
    fn direct_impact_from_targets() {
        let task = Task::new("2", "test", "High impact task").with_meta(
            "impact_targets",
            r#"[{"actor": "marketing", "impact": 0.8}, {"actor": "sales", "impact": 0.7}]"#,
        );
        let s = ImpactMapping
            .score(&task, &AnalysisConfig::default(), None)
            .unwrap();
        assert!((s.score - 0.7 * 0.75).abs() < 1e-12);
        assert_eq!(s.details["direct"]["actors"].as_array().map(Vec::len), Some(2));
        assert_eq!(s.labels[LABEL], "MEDIUM");
    }

    #[test]
    fn plain_names_take_default_impact() {
        let task = Task::new("t", "p", "x").with_meta("impact_targets", r#"["ops", "support"]"#);
        let s = ImpactMapping
            .score(&task, &AnalysisConfig::default(), None)
            .unwrap();
        assert!((s.score - 0.35).abs() < 1e-12);
    }

    #[test]
    fn indirect_impact_decays_with_depth() {
        let root = Task::new("root", "p", "root")
            .with_dependencies(["a"])
            .with_meta("impact_targets", r#"[{"actor": "x", "impact": 1.0}]"#);
        let index = TaskIndex::new(&[
            Task::new("a", "p", "a")
                .with_dependencies(["b", "missing"])
                .with_meta("impact_estimate", 0.4),
            Task::new("b", "p", "b")
                .with_dependencies(["c"])
                .with_meta("impact_estimate", 0.4),
            Task::new("c", "p", "c").with_meta("impact_estimate", 1.0),
        ]);
        let s = ImpactMapping
            .score(&root, &AnalysisConfig::default(), Some(&index))
            .unwrap();
        // a at level 0 (0.4), b at level 1 (0.2), c beyond depth 2.
        let indirect = s.details["indirect"]["score"].as_f64().unwrap();
        assert!((indirect - 0.6).abs() < 1e-12);
        assert!((s.score - 0.3f64.mul_add(0.6, 0.7)).abs() < 1e-12);
        assert_eq!(s.labels[LABEL], "BROAD");
    }

    #[test]
    fn cyclic_dependencies_terminate() {
        let root = Task::new("a", "p", "a").with_dependencies(["b"]);
        let index = TaskIndex::new(&[
            Task::new("a", "p", "a").with_dependencies(["b"]),
            Task::new("b", "p", "b").with_dependencies(["a"]),
        ]);
        let mut cfg = AnalysisConfig::default();
        cfg.impact_mapping.depth = 50;
        let s = ImpactMapping.score(&root, &cfg, Some(&index)).unwrap();
        assert!(s.score.is_finite());
    }
}
