//! Alignment of task goals with weighted project goals (OKRs).

use std::collections::BTreeMap;

use prio_core::config::AnalysisConfig;
use prio_core::entities::Task;
use prio_core::enums::{Alignment, Method};
use prio_core::lookup::TaskLookup;
use prio_core::metadata::parse_number;
use prio_core::numeric::clamp;
use serde_json::{Value, json};

use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "PURPOSE";

#[derive(Debug, Clone, Copy, Default)]
pub struct PurposeAlignment;

impl ScoringAgent for PurposeAlignment {
    fn method(&self) -> Method {
        Method::PurposeAlignment
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.purpose_alignment;
        let meta = &task.metadata;
        let task_goals = meta.string_list("goals");

        let from_meta = meta
            .decoded("project_goals")
            .or_else(|| meta.decoded("okrs"))
            .map(|v| goal_weights(&v))
            .filter(|goals| !goals.is_empty());
        let (project_goals, goals_source) = match from_meta {
            Some(goals) => (goals, "metadata"),
            None => (cfg.project_goals.clone(), "config"),
        };

        let total_weight: f64 = project_goals.values().sum();
        let mut matched_goals = Vec::new();
        let mut matched_weight = 0.0;
        for (goal, weight) in &project_goals {
            let goal_lower = goal.to_lowercase();
            let hit = task_goals.iter().any(|g| {
                let g = g.trim().to_lowercase();
                !g.is_empty() && (goal_lower.contains(&g) || g.contains(&goal_lower))
            });
            if hit {
                matched_goals.push(goal.clone());
                matched_weight += weight;
            }
        }

        let raw = if total_weight > 0.0 {
            clamp(matched_weight / total_weight, 0.0, 1.0)
        } else {
            0.0
        };
        let alignment = if raw >= cfg.aligned_threshold {
            Alignment::Aligned
        } else {
            Alignment::Misaligned
        };

        let mut details = json!({
            "task_goals": task_goals,
            "matched_goals": matched_goals,
            "matched_weight": matched_weight,
            "total_weight": total_weight,
            "project_goals_count": project_goals.len(),
            "project_goals_source": goals_source,
            "alignment": raw,
            "goal_weight": cfg.goal_weight,
        });
        if project_goals.is_empty() {
            details["reason"] = json!("no_project_goals");
        }

        Ok(Scored::new(raw * cfg.goal_weight)
            .with_details(details)
            .with_label(LABEL, alignment.as_str()))
    }
}

/// Goal → weight from an object, or equal weights from a list of names.
/// Negative or unparseable weights count as zero.
fn goal_weights(value: &Value) -> BTreeMap<String, f64> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(goal, w)| (goal.clone(), parse_number(w).unwrap_or(0.0).max(0.0)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|goal| (goal.to_string(), 1.0))
            .collect(),
        Value::String(goal) if !goal.trim().is_empty() => {
            BTreeMap::from([(goal.trim().to_string(), 1.0)])
        }
        _ => BTreeMap::new(),
    }
}
