//! Runs every analytics agent for a task (or a whole project) and folds the
//! results into a summary with threshold-triggered recommendations.

use std::collections::BTreeMap;

use prio_core::config::AnalyticsConfig;
use prio_core::entities::{Labels, Task};
use prio_core::enums::{DependencyLabel, ForecastTier, RiskLevel, TrendDirection};
use prio_core::lookup::TaskLookup;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dependency::{self, DependencyReport};
use crate::effort::{self, EffortForecast};
use crate::forensic::{self, ForensicReport};
use crate::risk::{self, RiskReport};
use crate::trend::{self, TrendReport};

const RECOMMEND_ESCALATE: &str = "High risk: escalate to the project owner.";
const RECOMMEND_TREND_UP: &str = "Effort trend is rising: revisit the estimates.";
const RECOMMEND_SIMPLIFY: &str = "Complex dependencies: simplify the task structure.";
const RECOMMEND_BREAK_CYCLE: &str = "Dependency cycle detected: break it before scheduling.";

/// Metadata keys written by [`AnalyticsReport::annotate`]. RICE reads the
/// risk score and every effort-based method reads the forecast.
pub use prio_core::entities::{
    DEPENDENCY_LABEL_KEY, FORECAST_EFFORT_KEY, FORECAST_SOURCE_KEY, RISK_SCORE_KEY,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub avg_risk: f64,
    pub risk_level: RiskLevel,
    pub trend: TrendDirection,
    pub expected_effort: f64,
    pub effort_source: ForecastTier,
    pub dependency_complexity: DependencyLabel,
    pub recommendations: Vec<String>,
}

/// Every analytics result for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub task_id: String,
    pub trend: TrendReport,
    pub risk: RiskReport,
    pub dependency: DependencyReport,
    pub effort: EffortForecast,
    /// Present when history was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forensic: Option<ForensicReport>,
    pub summary: Summary,
}

impl AnalyticsReport {
    /// Provenance labels of every agent, merged.
    #[must_use]
    pub fn labels(&self) -> Labels {
        let mut labels = self.trend.labels();
        labels.extend(self.risk.labels());
        labels.extend(self.dependency.labels());
        labels.extend(self.effort.labels());
        if let Some(forensic) = &self.forensic {
            labels.extend(forensic.labels());
        }
        labels
    }

    /// Write the forecast, risk and dependency results into `task.metadata`
    /// so later scoring runs can read them. Existing keys are left alone.
    pub fn annotate(&self, task: &mut Task) {
        let entries = [
            (FORECAST_EFFORT_KEY, serde_json::json!(self.effort.expected_effort)),
            (FORECAST_SOURCE_KEY, serde_json::json!(self.effort.tier.as_str())),
            (RISK_SCORE_KEY, serde_json::json!(self.risk.score)),
            (DEPENDENCY_LABEL_KEY, serde_json::json!(self.dependency.label.as_str())),
        ];
        for (key, value) in entries {
            if !task.metadata.contains(key) {
                task.metadata.insert(key, value);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub task_count: usize,
    pub avg_risk: f64,
    /// Task count per trend direction.
    pub trend_distribution: BTreeMap<String, usize>,
    pub total_expected_effort: f64,
    pub cyclic_tasks: Vec<String>,
    /// De-duplicated, in first-seen order.
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalytics {
    pub reports: Vec<AnalyticsReport>,
    /// Forensic analysis of the supplied history, run once for the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forensic: Option<ForensicReport>,
    pub summary: ProjectSummary,
}

/// Runs the analytics agents with one configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsAggregator {
    config: AnalyticsConfig,
    parallel: bool,
}

impl AnalyticsAggregator {
    #[must_use]
    pub const fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            parallel: true,
        }
    }

    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Analyze one task; forensic analysis runs over `history` when non-empty.
    #[must_use]
    pub fn run_task(
        &self,
        task: &Task,
        history: &[Task],
        lookup: Option<&dyn TaskLookup>,
    ) -> AnalyticsReport {
        let forensic = (!history.is_empty()).then(|| self.run_forensic(history));
        self.report_for(task, lookup, forensic)
    }

    #[must_use]
    pub fn run_forensic(&self, history: &[Task]) -> ForensicReport {
        forensic::analyze(history, &self.config.forensic)
    }

    /// Analyze every task and summarize the project. Reports keep input order.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn run_project(
        &self,
        tasks: &[Task],
        history: &[Task],
        lookup: Option<&dyn TaskLookup>,
    ) -> ProjectAnalytics {
        let one = |task: &Task| self.report_for(task, lookup, None);
        let reports: Vec<AnalyticsReport> = if self.parallel {
            tasks.par_iter().map(one).collect()
        } else {
            tasks.iter().map(one).collect()
        };
        let forensic = (!history.is_empty()).then(|| self.run_forensic(history));

        let mut trend_distribution: BTreeMap<String, usize> = BTreeMap::new();
        let mut cyclic_tasks = Vec::new();
        let mut recommendations: Vec<String> = Vec::new();
        let mut total_risk = 0.0;
        let mut total_expected_effort = 0.0;
        for report in &reports {
            *trend_distribution
                .entry(report.trend.direction.as_str().to_string())
                .or_default() += 1;
            if report.dependency.has_cycle {
                cyclic_tasks.push(report.task_id.clone());
            }
            total_risk += report.risk.score;
            total_expected_effort += report.effort.expected_effort;
            push_unique(&mut recommendations, &report.summary.recommendations);
        }
        if let Some(forensic) = &forensic {
            push_unique(&mut recommendations, &forensic.recommendations);
        }

        let avg_risk = if reports.is_empty() {
            0.0
        } else {
            total_risk / reports.len() as f64
        };
        tracing::debug!(tasks = reports.len(), avg_risk, "project analytics complete");

        ProjectAnalytics {
            summary: ProjectSummary {
                task_count: reports.len(),
                avg_risk,
                trend_distribution,
                total_expected_effort,
                cyclic_tasks,
                recommendations,
            },
            reports,
            forensic,
        }
    }

    fn report_for(
        &self,
        task: &Task,
        lookup: Option<&dyn TaskLookup>,
        forensic: Option<ForensicReport>,
    ) -> AnalyticsReport {
        let cfg = &self.config;
        let trend = trend::analyze(task, &cfg.trend);
        let risk = risk::analyze(task, &cfg.risk);
        let dependency = dependency::analyze(task, lookup, &cfg.dependency);
        let effort = effort::forecast(task, &cfg.effort);

        let mut recommendations = Vec::new();
        if risk.score > cfg.summary.escalate_risk {
            recommendations.push(RECOMMEND_ESCALATE.to_string());
        }
        if trend.direction == TrendDirection::Up {
            recommendations.push(RECOMMEND_TREND_UP.to_string());
        }
        match dependency.label {
            DependencyLabel::Complex => recommendations.push(RECOMMEND_SIMPLIFY.to_string()),
            DependencyLabel::Cycle => recommendations.push(RECOMMEND_BREAK_CYCLE.to_string()),
            DependencyLabel::Simple => {}
        }
        if let Some(forensic) = &forensic {
            push_unique(&mut recommendations, &forensic.recommendations);
        }

        let summary = Summary {
            avg_risk: risk.score,
            risk_level: risk.level,
            trend: trend.direction,
            expected_effort: effort.expected_effort,
            effort_source: effort.tier,
            dependency_complexity: dependency.label,
            recommendations,
        };
        AnalyticsReport {
            task_id: task.id.clone(),
            trend,
            risk,
            dependency,
            effort,
            forensic,
            summary,
        }
    }
}

fn push_unique(into: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !into.contains(item) {
            into.push(item.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prio_core::lookup::TaskIndex;

    #[test]
    fn risky_rising_task_gets_recommendations() {
        let task = Task::new("t", "p", "x")
            .with_meta("risk_prob", 1.0)
            .with_meta("risk_impact", 1.0)
            .with_meta("historical_failures", 10)
            .with_meta("history", "[1, 2, 3, 4]");
        let report = AnalyticsAggregator::default().run_task(&task, &[], None);
        assert_eq!(report.summary.trend, TrendDirection::Up);
        assert_eq!(
            report.summary.recommendations,
            vec![RECOMMEND_ESCALATE.to_string(), RECOMMEND_TREND_UP.to_string()]
        );
        assert!(report.forensic.is_none());
        let labels = report.labels();
        for key in ["TREND", "RISK_LEVEL", "DEP_LABEL", "EFFORT_SRC"] {
            assert!(labels.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn annotate_does_not_overwrite() {
        let mut task = Task::new("t", "p", "x")
            .with_effort(4.0)
            .with_meta(RISK_SCORE_KEY, "manual");
        let report = AnalyticsAggregator::default().run_task(&task, &[], None);
        report.annotate(&mut task);
        assert_eq!(task.metadata.number(FORECAST_EFFORT_KEY), Some(4.0));
        assert_eq!(task.metadata.text(FORECAST_SOURCE_KEY), Some("FALLBACK"));
        assert_eq!(task.metadata.text(RISK_SCORE_KEY), Some("manual"));
        assert_eq!(task.metadata.text(DEPENDENCY_LABEL_KEY), Some("SIMPLE"));
    }

    #[test]
    fn project_summary_collects_cycles_and_effort() {
        let tasks = vec![
            Task::new("a", "p", "a").with_effort(2.0).with_dependencies(["b"]),
            Task::new("b", "p", "b").with_effort(3.0).with_dependencies(["a"]),
            Task::new("c", "p", "c").with_effort(5.0),
        ];
        let index = TaskIndex::new(&tasks);
        let history = [Task::new("h", "p", "old")
            .with_meta("est_effort", 1)
            .with_meta("actual_effort", 3)];
        let project = AnalyticsAggregator::default()
            .with_parallel(false)
            .run_project(&tasks, &history, Some(&index));

        assert_eq!(project.summary.task_count, 3);
        assert_eq!(project.summary.cyclic_tasks, vec!["a", "b"]);
        assert_eq!(project.summary.total_expected_effort, 10.0);
        assert_eq!(project.summary.trend_distribution["FLAT"], 3);
        assert!(project.forensic.is_some());
        let recs = &project.summary.recommendations;
        assert_eq!(recs[0], RECOMMEND_BREAK_CYCLE);
        assert_eq!(recs.iter().filter(|r| *r == RECOMMEND_BREAK_CYCLE).count(), 1);
        assert!(recs.len() >= 2);
    }
}
