//! Blending under per-call weight overrides that a config file would reject.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use prio_core::config::AnalysisConfig;
use prio_core::entities::Task;
use prio_core::enums::Method;
use prio_scoring::PriorityOrchestrator;
use rstest::rstest;

fn task(id: &str, moscow: &str) -> Task {
    Task::new(id, "demo", "Ship onboarding")
        .with_effort(5.0)
        .with_reach(8000.0)
        .with_impact(2.0)
        .with_confidence(0.8)
        .with_meta("moscow", moscow)
}

fn config_with_rice_weight(weight: f64) -> AnalysisConfig {
    let mut config = AnalysisConfig::with_methods(["RICE", "MOSCOW"]);
    config.weights.insert("RICE".into(), weight);
    config
}

#[rstest]
#[case::infinite(f64::INFINITY)]
#[case::negative_infinite(f64::NEG_INFINITY)]
#[case::nan(f64::NAN)]
#[case::negative(-1.0)]
fn unusable_weight_drops_out_of_the_blend(#[case] weight: f64) {
    let config = config_with_rice_weight(weight);
    let orchestrator = PriorityOrchestrator::new();
    assert_eq!(orchestrator.effective_weight(&config, Method::Rice), 0.0);

    let report = orchestrator.analyze(&task("t1", "should"), &config, None);
    let aggregate = report.aggregate.as_ref().expect("both methods score");
    assert_eq!(aggregate.weights[&Method::Rice], 0.0);
    assert!(aggregate.weighted_score.is_finite());
    assert_eq!(aggregate.weighted_score, aggregate.per_method_norm[&Method::Moscow]);
}

#[test]
fn mixed_sign_weights_stay_inside_the_unit_interval() {
    let mut config = AnalysisConfig::with_methods(["RICE", "MOSCOW"]);
    config.weights.insert("RICE".into(), 3.0);
    config.user_overrides.insert("MOSCOW".into(), -1.0);

    let report = PriorityOrchestrator::new().analyze(&task("t1", "must"), &config, None);
    let aggregate = report.aggregate.as_ref().expect("both methods score");
    assert_eq!(aggregate.weights[&Method::Moscow], 0.0);
    assert!((0.0..=1.0).contains(&aggregate.weighted_score));
    assert_eq!(aggregate.weighted_score, aggregate.per_method_norm[&Method::Rice]);
}

#[test]
fn global_weights_are_checked_too() {
    let globals = BTreeMap::from([("RICE".to_string(), f64::INFINITY)]);
    let orchestrator = PriorityOrchestrator::new().with_global_weights(&globals);
    let config = AnalysisConfig::with_methods(["RICE", "MOSCOW"]);
    assert_eq!(orchestrator.effective_weight(&config, Method::Rice), 0.0);
    assert_eq!(orchestrator.effective_weight(&config, Method::Moscow), 0.7);
}

#[test]
fn ranking_with_an_infinite_weight_uses_finite_scores() {
    let config = config_with_rice_weight(f64::INFINITY);
    let tasks = vec![task("could", "could"), task("must", "must")];
    let ranked = PriorityOrchestrator::new()
        .with_parallel(false)
        .rank_tasks(&tasks, &config, None);

    assert!(
        ranked
            .iter()
            .all(|r| r.report.weighted_score().is_some_and(f64::is_finite))
    );
    let scores: Vec<f64> = ranked
        .iter()
        .map(|r| r.report.weighted_score().unwrap_or_default())
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
}
