//! Behavioural guarantees of the analytics agents, exercised through the
//! public API.

use pretty_assertions::assert_eq;
use prio_analytics::{AnalyticsAggregator, dependency, effort, forensic};
use prio_core::config::{AnalyticsConfig, DependencyConfig, EffortForecastConfig, ForensicConfig};
use prio_core::entities::Task;
use prio_core::enums::{DependencyLabel, ForecastTier, ForensicLevel};
use prio_core::lookup::{TaskIndex, TaskLookup};

#[test]
fn a_b_a_cycle_is_reported_without_order() {
    let tasks = [
        Task::new("A", "p", "a").with_dependencies(["B"]),
        Task::new("B", "p", "b").with_dependencies(["A"]),
    ];
    let index = TaskIndex::new(&tasks);
    let report = dependency::analyze(&tasks[0], Some(&index), &DependencyConfig::default());
    assert!(report.has_cycle);
    assert!(report.topological_order.is_empty());
    assert!(report.execution_order.is_empty());
    assert_eq!(report.label, DependencyLabel::Cycle);
}

#[test]
fn null_lookup_never_fails() {
    let lookup = |_: &str| -> Option<Task> { None };
    let root = Task::new("A", "p", "a").with_dependencies(["B", "C"]);
    let report = dependency::analyze(&root, Some(&lookup as &dyn TaskLookup), &DependencyConfig::default());
    assert_eq!(report.node_count, 3);
    assert_eq!(report.label, DependencyLabel::Simple);
}

#[test]
fn pert_without_history_is_exact() {
    let task = Task::new("t", "p", "x")
        .with_meta("effort_o", 1)
        .with_meta("effort_m", 2)
        .with_meta("effort_p", 3);
    let forecast = effort::forecast(&task, &EffortForecastConfig::default());
    assert_eq!(forecast.expected_effort, 2.0);
    assert_eq!(forecast.method, "PERT");
}

#[test]
fn short_history_uses_fallback_effort() {
    let task = Task::new("t", "p", "x")
        .with_effort(5.0)
        .with_meta("history_efforts", "[3]");
    let forecast = effort::forecast(&task, &EffortForecastConfig::default());
    assert_eq!(forecast.method, "FALLBACK");
    assert_eq!(forecast.tier, ForecastTier::Fallback);
    assert_eq!(forecast.expected_effort, 5.0);
}

#[test]
fn overrun_raises_forensic_severity() {
    let history = [Task::new("h", "p", "x")
        .with_meta("est_effort", 5)
        .with_meta("actual_effort", 10)];
    let report = forensic::analyze(&history, &ForensicConfig::default());
    assert_eq!(report.details["under_estimates"], 1);
    assert!(report.score > 0.0);
    assert_ne!(report.level, ForensicLevel::Empty);
}

#[test]
fn every_report_is_finite_on_garbage_metadata() {
    let task = Task::new("t", "p", "x")
        .with_meta("history", "{oops")
        .with_meta("history_efforts", "[\"a\", null]")
        .with_meta("risk_prob", "high")
        .with_meta("historical_failures", "-3")
        .with_meta("effort_o", "x")
        .with_dependencies(["t"]);
    let report = AnalyticsAggregator::new(AnalyticsConfig::default()).run_task(&task, &[task.clone()], None);
    for value in [
        report.trend.score,
        report.risk.score,
        report.dependency.score,
        report.effort.expected_effort,
        report.summary.avg_risk,
    ] {
        assert!(value.is_finite());
    }
    assert_eq!(report.labels().len(), 5);
}
