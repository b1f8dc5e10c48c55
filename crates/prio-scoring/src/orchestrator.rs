//! Priority orchestrator: runs the configured methods for a task, normalizes
//! their heterogeneous scores, and blends them into one weighted priority.
//!
//! Normalization is min-max across the methods that succeeded for the task;
//! when every method produced the same raw score each normalized value is 0.5.
//! A failing method is recorded under its own key and excluded from the blend.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use prio_core::config::AnalysisConfig;
use prio_core::entities::{Details, Labels, MethodScore, Task, TaskAnalysis};
use prio_core::enums::Method;
use prio_core::lookup::TaskLookup;
use prio_core::numeric::{clamp, sanitize};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::agent::{ScoringAgent, Scored};
use crate::agents::agent_for;
use crate::error::ScoringError;

/// Outcome of one method for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodOutcome {
    Scored {
        score: f64,
        details: Details,
        labels: Labels,
    },
    Failed {
        error: String,
    },
}

/// Normalized, weighted blend of the successful methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub weighted_score: f64,
    /// Successful methods in configured order.
    pub used_methods: Vec<Method>,
    pub normalization: String,
    pub per_method_norm: BTreeMap<Method, f64>,
    /// Effective weight per method.
    pub weights: BTreeMap<Method, f64>,
}

/// Per-method audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub task_id: String,
    pub method: Method,
    pub score: f64,
    pub labels: Labels,
    pub details: Details,
    /// The method's sub-configuration at scoring time.
    pub config_used: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub aggregated: bool,
}

/// Everything the orchestrator produced for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityReport {
    pub task_id: String,
    pub by_method: BTreeMap<Method, MethodOutcome>,
    pub aggregate: Option<Aggregate>,
    pub snapshots: Vec<Snapshot>,
}

impl PriorityReport {
    #[must_use]
    pub fn weighted_score(&self) -> Option<f64> {
        self.aggregate.as_ref().map(|a| a.weighted_score)
    }

    /// Labels of every successful method merged into one map.
    #[must_use]
    pub fn labels(&self) -> Labels {
        self.by_method
            .values()
            .filter_map(|outcome| match outcome {
                MethodOutcome::Scored { labels, .. } => Some(labels.clone()),
                MethodOutcome::Failed { .. } => None,
            })
            .flatten()
            .collect()
    }

    /// Error message per failed method, keyed by wire name.
    #[must_use]
    pub fn errors(&self) -> BTreeMap<String, String> {
        self.by_method
            .iter()
            .filter_map(|(method, outcome)| match outcome {
                MethodOutcome::Failed { error } => Some((method.to_string(), error.clone())),
                MethodOutcome::Scored { .. } => None,
            })
            .collect()
    }

    /// Persistable form of the report.
    #[must_use]
    pub fn to_task_analysis(&self) -> TaskAnalysis {
        let method_scores = self
            .snapshots
            .iter()
            .map(|snap| MethodScore {
                method: snap.method,
                score: snap.score,
                details: snap.details.clone(),
                labels: snap.labels.clone(),
            })
            .collect();
        TaskAnalysis {
            task_id: self.task_id.clone(),
            method_scores,
            combined_score: self.weighted_score(),
            labels: self.labels(),
            errors: self.errors(),
        }
    }
}

/// A task paired with its report, as returned by [`PriorityOrchestrator::rank_tasks`].
#[derive(Debug, Clone, Serialize)]
pub struct RankedTask<'a> {
    pub task: &'a Task,
    pub report: PriorityReport,
}

/// Runs scoring agents and aggregates their output.
///
/// Holds only static configuration, so one orchestrator can score any number
/// of tasks concurrently.
#[derive(Clone)]
pub struct PriorityOrchestrator {
    overrides: HashMap<Method, Arc<dyn ScoringAgent>>,
    global_weights: BTreeMap<Method, f64>,
    parallel: bool,
}

impl Default for PriorityOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PriorityOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityOrchestrator")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .field("global_weights", &self.global_weights)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl PriorityOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
            global_weights: BTreeMap::new(),
            parallel: true,
        }
    }

    /// Orchestrator-level weight multipliers keyed by method name. Unknown
    /// names are ignored.
    #[must_use]
    pub fn with_global_weights(mut self, weights: &BTreeMap<String, f64>) -> Self {
        for (name, weight) in weights {
            match name.parse::<Method>() {
                Ok(method) => {
                    self.global_weights.insert(method, *weight);
                }
                Err(_) => tracing::debug!(method = %name, "ignoring global weight for unknown method"),
            }
        }
        self
    }

    /// Score batches on the rayon pool (default) or sequentially.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replace the built-in agent for `agent.method()`.
    #[must_use]
    pub fn with_agent(mut self, agent: Arc<dyn ScoringAgent>) -> Self {
        self.overrides.insert(agent.method(), agent);
        self
    }

    fn agent(&self, method: Method) -> &dyn ScoringAgent {
        self.overrides
            .get(&method)
            .map_or_else(|| agent_for(method), |agent| agent.as_ref())
    }

    /// Configured methods resolved to the closed set, in order, without
    /// duplicates. Names that match no method are skipped.
    #[must_use]
    pub fn resolve_methods(config: &AnalysisConfig) -> Vec<Method> {
        let mut methods = Vec::with_capacity(config.methods.len());
        for name in &config.methods {
            match name.parse::<Method>() {
                Ok(method) if !methods.contains(&method) => methods.push(method),
                Ok(_) => {}
                Err(_) => tracing::debug!(method = %name, "skipping unknown scoring method"),
            }
        }
        methods
    }

    /// Effective weight: base × user override × global multiplier.
    ///
    /// A product that is negative or not finite counts as 0.0, so the method
    /// still reports its normalized score but does not move the blend.
    #[must_use]
    pub fn effective_weight(&self, config: &AnalysisConfig, method: Method) -> f64 {
        let mut weight = config.weight_for(method);
        if let Some(user) = config.override_for(method) {
            weight *= user;
        }
        if let Some(global) = self.global_weights.get(&method) {
            weight *= global;
        }
        if weight.is_finite() && weight >= 0.0 {
            weight
        } else {
            tracing::warn!(%method, weight, "ignoring unusable method weight");
            0.0
        }
    }

    /// Score one task with every configured method and aggregate.
    pub fn analyze(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        lookup: Option<&dyn TaskLookup>,
    ) -> PriorityReport {
        let mut by_method = BTreeMap::new();
        let mut snapshots = Vec::new();
        let mut raw: Vec<(Method, f64)> = Vec::new();

        for method in Self::resolve_methods(config) {
            match self.run_agent(method, task, config, lookup) {
                Ok(scored) => {
                    raw.push((method, scored.score));
                    snapshots.push(Snapshot {
                        task_id: task.id.clone(),
                        method,
                        score: scored.score,
                        labels: scored.labels.clone(),
                        details: scored.details.clone(),
                        config_used: config.method_config_json(method),
                        timestamp: Utc::now(),
                        aggregated: false,
                    });
                    by_method.insert(
                        method,
                        MethodOutcome::Scored {
                            score: scored.score,
                            details: scored.details,
                            labels: scored.labels,
                        },
                    );
                }
                Err(error) => {
                    tracing::warn!(task_id = %task.id, %method, %error, "scoring method failed");
                    by_method.insert(
                        method,
                        MethodOutcome::Failed {
                            error: error.to_string(),
                        },
                    );
                }
            }
        }

        let aggregate = self.aggregate(config, &raw);
        PriorityReport {
            task_id: task.id.clone(),
            by_method,
            aggregate,
            snapshots,
        }
    }

    /// Run one agent, containing panics and sanitizing the score.
    fn run_agent(
        &self,
        method: Method,
        task: &Task,
        config: &AnalysisConfig,
        lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let agent = self.agent(method);
        let result = catch_unwind(AssertUnwindSafe(|| agent.score(task, config, lookup)))
            .map_err(|payload| ScoringError::Panicked {
                method,
                message: panic_message(payload.as_ref()),
            })?;
        result.map(|scored| Scored {
            score: sanitize(scored.score),
            ..scored
        })
    }

    fn aggregate(&self, config: &AnalysisConfig, raw: &[(Method, f64)]) -> Option<Aggregate> {
        if raw.is_empty() {
            return None;
        }
        let per_method_norm = minmax_normalize(raw);
        let weights: BTreeMap<Method, f64> = raw
            .iter()
            .map(|(m, _)| (*m, self.effective_weight(config, *m)))
            .collect();

        let denom: f64 = weights.values().sum();
        let weighted_score = if denom > 0.0 {
            per_method_norm
                .iter()
                .map(|(m, norm)| norm * weights.get(m).copied().unwrap_or(1.0))
                .sum::<f64>()
                / denom
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = per_method_norm.len() as f64;
            per_method_norm.values().sum::<f64>() / n
        };

        Some(Aggregate {
            weighted_score: clamp(sanitize(weighted_score), 0.0, 1.0),
            used_methods: raw.iter().map(|(m, _)| *m).collect(),
            normalization: "minmax".to_string(),
            per_method_norm,
            weights,
        })
    }

    /// Score every task and sort by aggregate score, descending. Tasks with no
    /// aggregate sort as 0.0; equal scores keep input order.
    pub fn rank_tasks<'a>(
        &self,
        tasks: &'a [Task],
        config: &AnalysisConfig,
        lookup: Option<&dyn TaskLookup>,
    ) -> Vec<RankedTask<'a>> {
        let score_one = |task: &'a Task| RankedTask {
            task,
            report: self.analyze(task, config, lookup),
        };
        let mut ranked: Vec<RankedTask<'a>> = if self.parallel {
            tasks.par_iter().map(score_one).collect()
        } else {
            tasks.iter().map(score_one).collect()
        };
        ranked.sort_by(|a, b| {
            let a = a.report.weighted_score().unwrap_or(0.0);
            let b = b.report.weighted_score().unwrap_or(0.0);
            b.total_cmp(&a)
        });
        ranked
    }
}

/// Min-max normalize into `[0, 1]`; a zero range maps every method to 0.5.
#[must_use]
pub fn minmax_normalize(raw: &[(Method, f64)]) -> BTreeMap<Method, f64> {
    let lo = raw.iter().map(|(_, s)| *s).fold(f64::INFINITY, f64::min);
    let hi = raw.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);
    raw.iter()
        .map(|(m, s)| {
            let norm = if hi > lo { (s - lo) / (hi - lo) } else { 0.5 };
            (*m, norm)
        })
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
