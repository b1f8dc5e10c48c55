use prio_core::entities::{AnalysisResult, Labels};
use prio_scoring::analyze_project;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AnalyzeArgs;
use crate::context::AppContext;
use crate::output::output_rows;
use crate::output::table::{Cell, TableRow};

#[derive(Debug, Serialize)]
pub struct AnalyzedRow {
    pub task_id: String,
    pub combined_score: Option<f64>,
    pub labels: Labels,
    pub failed_methods: usize,
}

pub fn handle(args: &AnalyzeArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = ctx.analysis_config(&args.methods.methods);
    let result = analyze_project(&ctx.store, &ctx.orchestrator(), &args.project, &config)?;
    tracing::info!(
        project = %result.project_id,
        tasks = result.tasks.len(),
        "analysis saved"
    );

    output_rows(&result, &analyzed_rows(&result), flags.format)
}

impl TableRow for AnalyzedRow {
    const HEADERS: &'static [&'static str] = &["task_id", "score", "failed", "labels"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Key(self.task_id.clone()),
            Cell::Number(self.combined_score),
            Cell::Count(self.failed_methods),
            Cell::labels(&self.labels),
        ]
    }
}

pub fn analyzed_rows(result: &AnalysisResult) -> Vec<AnalyzedRow> {
    result
        .tasks
        .iter()
        .map(|t| AnalyzedRow {
            task_id: t.task_id.clone(),
            combined_score: t.combined_score,
            labels: t.labels.clone(),
            failed_methods: t.errors.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use prio_core::config::AnalysisConfig;
    use prio_core::entities::Task;
    use prio_core::lookup::Repository;
    use prio_scoring::PriorityOrchestrator;
    use prio_store::MemoryRepository;

    use super::*;

    #[test]
    fn rows_mirror_the_saved_result() {
        let repo = MemoryRepository::with_tasks([
            Task::new("a", "web", "A").with_meta("moscow", "should"),
            Task::new("b", "web", "B"),
        ]);
        let config = AnalysisConfig::with_methods(["MOSCOW"]);
        let result = analyze_project(&repo, &PriorityOrchestrator::new(), "web", &config)
            .expect("analysis");

        let rows = analyzed_rows(&result);
        let ids: Vec<&str> = rows.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(rows[0].combined_score, Some(0.5));
        assert_eq!(rows[0].failed_methods, 0);
        let stored = repo.fetch_tasks("web").expect("fetch");
        assert_eq!(stored[0].metadata.text("MOSCOW"), Some("should"));
    }
}
