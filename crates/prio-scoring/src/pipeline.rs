//! Project-level analysis against a repository.

use std::collections::BTreeMap;

use chrono::Utc;
use prio_core::config::AnalysisConfig;
use prio_core::entities::AnalysisResult;
use prio_core::lookup::{Repository, TaskLookup};

use crate::error::ScoringError;
use crate::orchestrator::PriorityOrchestrator;

/// Score every task of `project_id`, write merged labels back to the
/// repository, and save the resulting [`AnalysisResult`].
///
/// Tasks keep the order the repository returned them in. The repository also
/// serves as the dependency lookup for strategic agents.
///
/// # Errors
///
/// Returns [`ScoringError::Repository`] if fetching, labelling, or saving
/// fails. Individual method failures are recorded in the result instead.
pub fn analyze_project<R: Repository>(
    repo: &R,
    orchestrator: &PriorityOrchestrator,
    project_id: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, ScoringError> {
    let tasks = repo.fetch_tasks(project_id)?;
    tracing::debug!(project_id, tasks = tasks.len(), "analyzing project");

    let lookup: &dyn TaskLookup = repo;
    let mut analyses = Vec::with_capacity(tasks.len());
    let mut labels = BTreeMap::new();
    for task in &tasks {
        let analysis = orchestrator.analyze(task, config, Some(lookup)).to_task_analysis();
        if !analysis.labels.is_empty() {
            labels.insert(task.id.clone(), analysis.labels.clone());
        }
        analyses.push(analysis);
    }
    repo.update_project_labels(project_id, &labels)?;

    let result = AnalysisResult {
        project_id: project_id.to_string(),
        tasks: analyses,
        created_at: Utc::now(),
        config_used: config.clone(),
    };
    repo.save_analysis(&result)?;
    Ok(result)
}
