use prio_core::entities::Labels;
use prio_scoring::RankedTask;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RankArgs;
use crate::commands::shared::limit::apply_limit;
use crate::commands::shared::tasks::TaskSet;
use crate::context::AppContext;
use crate::output::output_rows;
use crate::output::table::{Cell, TableRow};

#[derive(Debug, Serialize)]
pub struct RankRow {
    pub rank: usize,
    pub task_id: String,
    pub title: String,
    pub score: Option<f64>,
    pub methods: usize,
    pub labels: Labels,
}

impl RankRow {
    fn from_ranked(rank: usize, ranked: &RankedTask<'_>) -> Self {
        Self {
            rank,
            task_id: ranked.task.id.clone(),
            title: ranked.task.title.clone(),
            score: ranked.report.weighted_score(),
            methods: ranked
                .report
                .aggregate
                .as_ref()
                .map_or(0, |a| a.used_methods.len()),
            labels: ranked.report.labels(),
        }
    }
}

pub fn handle(args: &RankArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let set = TaskSet::load(ctx, args.project.as_deref(), args.input.as_deref())?;
    let config = ctx.analysis_config(&args.methods.methods);

    let ranked = ctx
        .orchestrator()
        .rank_tasks(&set.tasks, &config, Some(set.lookup(ctx)));
    let mut rows = rank_rows(&ranked);
    apply_limit(&mut rows, flags.limit);

    output_rows(&rows, &rows, flags.format)
}

impl TableRow for RankRow {
    const HEADERS: &'static [&'static str] =
        &["rank", "task_id", "title", "score", "methods", "labels"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Count(self.rank),
            Cell::Key(self.task_id.clone()),
            Cell::Text(self.title.clone()),
            Cell::Number(self.score),
            Cell::Count(self.methods),
            Cell::labels(&self.labels),
        ]
    }
}

/// 1-based ranks in score order.
pub fn rank_rows(ranked: &[RankedTask<'_>]) -> Vec<RankRow> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, r)| RankRow::from_ranked(i + 1, r))
        .collect()
}

#[cfg(test)]
mod tests {
    use prio_core::config::AnalysisConfig;
    use prio_core::entities::Task;
    use prio_scoring::PriorityOrchestrator;

    use super::*;

    #[test]
    fn rows_follow_the_ranking() {
        let tasks = vec![
            Task::new("small", "p", "Small").with_meta("value", 2).with_meta("effort", 8),
            Task::new("big", "p", "Big").with_meta("value", 9).with_meta("effort", 1),
        ];
        let config = AnalysisConfig::with_methods(["VALUE_EFFORT", "OPPORTUNITY"]);
        let ranked = PriorityOrchestrator::new()
            .with_parallel(false)
            .rank_tasks(&tasks, &config, None);

        let rows = rank_rows(&ranked);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.methods == 2));
        assert!(rows.iter().all(|row| row.labels.contains_key("VALUE_EFFORT_BIN")));
    }
}
