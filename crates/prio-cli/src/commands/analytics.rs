use anyhow::Context;
use prio_analytics::{AnalyticsReport, ProjectAnalytics};
use prio_core::entities::Task;
use prio_core::enums::{DependencyLabel, ForecastTier, RiskLevel, TrendDirection};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AnalyticsArgs;
use crate::commands::shared::limit::apply_limit;
use crate::commands::shared::tasks::{TaskSet, read_tasks_file};
use crate::context::AppContext;
use crate::output::output_rows;
use crate::output::table::{Cell, TableRow};

#[derive(Debug, Serialize)]
pub struct AnalyticsRow {
    pub task_id: String,
    pub risk: f64,
    pub risk_level: RiskLevel,
    pub trend: TrendDirection,
    pub expected_effort: f64,
    pub effort_source: ForecastTier,
    pub dependencies: DependencyLabel,
    pub recommendations: usize,
}

impl From<&AnalyticsReport> for AnalyticsRow {
    fn from(report: &AnalyticsReport) -> Self {
        let summary = &report.summary;
        Self {
            task_id: report.task_id.clone(),
            risk: summary.avg_risk,
            risk_level: summary.risk_level,
            trend: summary.trend,
            expected_effort: summary.expected_effort,
            effort_source: summary.effort_source,
            dependencies: summary.dependency_complexity,
            recommendations: summary.recommendations.len(),
        }
    }
}

pub fn handle(args: &AnalyticsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let set = TaskSet::load(ctx, args.project.as_deref(), args.input.as_deref())?;
    let history = match &args.history {
        Some(path) => read_tasks_file(path)?,
        None => Vec::new(),
    };
    let aggregator = ctx.aggregator();
    let lookup = set.lookup(ctx);

    if let Some(id) = &args.task {
        let Some(task) = set.find(id) else {
            anyhow::bail!("task {id} not found");
        };
        let report = aggregator.run_task(task, &history, Some(lookup));
        if args.annotate {
            annotate(ctx, std::slice::from_ref(task), std::slice::from_ref(&report))?;
        }
        return output_rows(&report, &[AnalyticsRow::from(&report)], flags.format);
    }

    let project = aggregator.run_project(&set.tasks, &history, Some(lookup));
    if args.annotate {
        annotate(ctx, &set.tasks, &project.reports)?;
    }
    output_rows(&project, &project_rows(&project, flags.limit), flags.format)
}

impl TableRow for AnalyticsRow {
    const HEADERS: &'static [&'static str] = &[
        "task_id",
        "risk",
        "risk_level",
        "trend",
        "effort",
        "source",
        "dependencies",
        "advice",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Key(self.task_id.clone()),
            Cell::Number(Some(self.risk)),
            Cell::level(self.risk_level.as_str(), self.risk_level),
            Cell::Key(self.trend.as_str().to_string()),
            Cell::Number(Some(self.expected_effort)),
            Cell::level(self.effort_source.as_str(), self.effort_source),
            Cell::level(self.dependencies.as_str(), self.dependencies),
            Cell::Count(self.recommendations),
        ]
    }
}

pub fn project_rows(project: &ProjectAnalytics, limit: Option<u32>) -> Vec<AnalyticsRow> {
    let mut rows: Vec<AnalyticsRow> = project.reports.iter().map(AnalyticsRow::from).collect();
    apply_limit(&mut rows, limit);
    rows
}

/// Write each report's results into its task and store the updated records.
fn annotate(ctx: &AppContext, tasks: &[Task], reports: &[AnalyticsReport]) -> anyhow::Result<()> {
    let annotated = annotated_tasks(tasks, reports);
    let count = ctx
        .store
        .import_tasks(&annotated)
        .context("failed to store annotated tasks")?;
    tracing::info!(tasks = count, "annotated tasks");
    Ok(())
}

/// Pairs reports with tasks by id; a task without a report is skipped.
pub fn annotated_tasks(tasks: &[Task], reports: &[AnalyticsReport]) -> Vec<Task> {
    tasks
        .iter()
        .filter_map(|task| {
            let report = reports.iter().find(|r| r.task_id == task.id)?;
            let mut task = task.clone();
            report.annotate(&mut task);
            Some(task)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use prio_analytics::AnalyticsAggregator;
    use prio_core::config::AnalyticsConfig;

    use super::*;

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("a", "p", "A")
                .with_meta("effort_o", 1)
                .with_meta("effort_m", 2)
                .with_meta("effort_p", 3),
            Task::new("b", "p", "B").with_effort(5.0),
            Task::new("c", "p", "C").with_meta("risk_score", 0.9),
        ]
    }

    #[test]
    fn rows_summarize_each_report() {
        let tasks = tasks();
        let project = AnalyticsAggregator::new(AnalyticsConfig::default())
            .with_parallel(false)
            .run_project(&tasks, &[], None);

        let rows = project_rows(&project, None);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].effort_source, ForecastTier::Pert);
        assert!((rows[0].expected_effort - 2.0).abs() < 1e-9);
        assert_eq!(rows[1].effort_source, ForecastTier::Fallback);
        assert_eq!(rows[2].dependencies, DependencyLabel::Simple);

        assert_eq!(project_rows(&project, Some(1)).len(), 1);
    }

    #[test]
    fn annotation_keeps_existing_keys() {
        let tasks = tasks();
        let project = AnalyticsAggregator::new(AnalyticsConfig::default())
            .with_parallel(false)
            .run_project(&tasks, &[], None);

        let annotated = annotated_tasks(&tasks, &project.reports);
        assert_eq!(annotated.len(), 3);
        assert_eq!(annotated[0].metadata.number("forecast_effort"), Some(2.0));
        assert_eq!(annotated[0].metadata.text("forecast_source"), Some("PERT"));
        assert_eq!(annotated[2].metadata.number("risk_score"), Some(0.9));
    }
}
