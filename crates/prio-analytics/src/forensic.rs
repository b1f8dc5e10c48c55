//! Retrospective over completed tasks: estimation accuracy, recurring
//! blockers and resource problems.

use prio_core::config::ForensicConfig;
use prio_core::entities::{Details, Labels, Task};
use prio_core::enums::ForensicLevel;
use prio_core::numeric::clamp;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const LABEL: &str = "FORENSIC_LEVEL";

const UNDERESTIMATE_EXAMPLES: usize = 5;

const RECOMMEND_ESTIMATION: &str =
    "Review the estimation process; use PERT or planning poker for similar tasks.";
const RECOMMEND_BLOCKERS: &str = "Investigate the top blockers and create dedicated remediation tasks.";
const RECOMMEND_RESOURCES: &str = "Address resource allocation (hiring or redistribution).";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForensicReport {
    /// Severity in `[0, 1]`.
    pub score: f64,
    pub level: ForensicLevel,
    pub recommendations: Vec<String>,
    pub details: Details,
}

impl ForensicReport {
    #[must_use]
    pub fn labels(&self) -> Labels {
        Labels::from([(LABEL.to_string(), self.level.as_str().to_string())])
    }
}

#[must_use]
pub fn level_for(severity: f64, cfg: &ForensicConfig) -> ForensicLevel {
    if severity >= cfg.critical_threshold {
        ForensicLevel::Critical
    } else if severity >= cfg.high_threshold {
        ForensicLevel::High
    } else {
        ForensicLevel::Ok
    }
}

/// Analyze historical tasks.
///
/// Reads `est_effort`, `actual_effort`, `blockers`, `resource_issue` and
/// `delay_days` from each task's metadata.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze(history: &[Task], cfg: &ForensicConfig) -> ForensicReport {
    if history.is_empty() {
        let mut details = Details::new();
        details.insert("reason".into(), json!("no_history"));
        return ForensicReport {
            score: 0.0,
            level: ForensicLevel::Empty,
            recommendations: Vec::new(),
            details,
        };
    }

    let mut estimated = 0usize;
    let mut under_estimates = 0usize;
    let mut under_by = Vec::new();
    // First-seen order breaks count ties.
    let mut blockers: Vec<(String, usize)> = Vec::new();
    let mut resource_issues = 0usize;
    let mut delays = Vec::new();

    for task in history {
        let meta = &task.metadata;
        if let (Some(est), Some(actual)) = (meta.number("est_effort"), meta.number("actual_effort"))
        {
            estimated += 1;
            if actual > est * (1.0 + cfg.delay_threshold_ratio) {
                under_estimates += 1;
                let ratio = if est > 0.0 { Some(actual / est) } else { None };
                under_by.push(json!({ "task_id": task.id, "ratio": ratio }));
            }
        }
        for blocker in meta.string_list("blockers") {
            match blockers.iter_mut().find(|(name, _)| *name == blocker) {
                Some((_, count)) => *count += 1,
                None => blockers.push((blocker, 1)),
            }
        }
        if meta.flag("resource_issue") {
            resource_issues += 1;
        }
        let delay = meta.number_or("delay_days", 0.0);
        if delay > 0.0 {
            delays.push(delay);
        }
    }

    blockers.sort_by(|a, b| b.1.cmp(&a.1));
    blockers.truncate(cfg.top_blockers);

    let records = history.len() as f64;
    let recurring: usize = blockers.iter().map(|(_, count)| count).sum();
    let recurrence_ratio = (recurring as f64 / records).min(1.0);
    let underestimate_ratio = if estimated > 0 {
        under_estimates as f64 / estimated as f64
    } else {
        0.0
    };
    let resource_ratio = resource_issues as f64 / records;
    let avg_delay = prio_core::numeric::mean(&delays).unwrap_or(0.0);

    let severity = clamp(
        cfg.underestimate_weight * underestimate_ratio
            + cfg.recurrence_weight * recurrence_ratio
            + cfg.resource_weight * resource_ratio,
        0.0,
        1.0,
    );

    let mut recommendations = Vec::new();
    if underestimate_ratio > cfg.underestimate_alert {
        recommendations.push(RECOMMEND_ESTIMATION.to_string());
    }
    if recurrence_ratio > cfg.recurrence_alert {
        recommendations.push(RECOMMEND_BLOCKERS.to_string());
    }
    if resource_ratio > cfg.resource_alert {
        recommendations.push(RECOMMEND_RESOURCES.to_string());
    }

    under_by.truncate(UNDERESTIMATE_EXAMPLES);
    let mut details = Details::new();
    details.insert("records".into(), json!(history.len()));
    details.insert("under_estimates".into(), json!(under_estimates));
    details.insert("total_est_records".into(), json!(estimated));
    details.insert("under_by_examples".into(), json!(under_by));
    details.insert(
        "common_blockers".into(),
        blockers
            .iter()
            .map(|(blocker, count)| json!({ "blocker": blocker, "count": count }))
            .collect(),
    );
    details.insert("resource_issues".into(), json!(resource_issues));
    details.insert("avg_delay_days".into(), json!(avg_delay));
    details.insert("underestimate_ratio".into(), json!(underestimate_ratio));
    details.insert("recurrence_ratio".into(), json!(recurrence_ratio));

    ForensicReport {
        score: severity,
        level: level_for(severity, cfg),
        recommendations,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn overrun_counts_as_underestimate() {
        let history = [Task::new("h1", "p", "x")
            .with_meta("est_effort", 5)
            .with_meta("actual_effort", 10)];
        let report = analyze(&history, &ForensicConfig::default());
        assert_eq!(report.details["under_estimates"], 1);
        assert!(report.score > 0.0);
        assert!((report.score - 0.6).abs() < 1e-12);
        assert_eq!(report.level, ForensicLevel::High);
        assert_eq!(report.recommendations, vec![RECOMMEND_ESTIMATION.to_string()]);
        assert_eq!(report.details["under_by_examples"][0]["ratio"], 2.0);
    }

    #[test]
    fn empty_history() {
        let report = analyze(&[], &ForensicConfig::default());
        assert_eq!(report.score, 0.0);
        assert_eq!(report.labels()[LABEL], "EMPTY");
    }

    #[test]
    fn blockers_resources_and_delays() {
        let history = [
            Task::new("a", "p", "x")
                .with_meta("blockers", r#"["review", "ci"]"#)
                .with_meta("delay_days", 4),
            Task::new("b", "p", "x")
                .with_meta("blockers", "ci")
                .with_meta("resource_issue", true)
                .with_meta("delay_days", 2),
            Task::new("c", "p", "x")
                .with_meta("est_effort", 5)
                .with_meta("actual_effort", 5.5),
            Task::new("d", "p", "x"),
        ];
        let report = analyze(&history, &ForensicConfig::default());
        assert_eq!(report.details["common_blockers"][0]["blocker"], "ci");
        assert_eq!(report.details["common_blockers"][0]["count"], 2);
        assert_eq!(report.details["under_estimates"], 0);
        assert_eq!(report.details["avg_delay_days"], 3.0);
        // recurrence 3/4, resource 1/4
        assert!((report.score - (0.2 * 0.75 + 0.2 * 0.25)).abs() < 1e-12);
        assert_eq!(report.level, ForensicLevel::Ok);
        assert_eq!(report.recommendations.len(), 2);
    }
}
