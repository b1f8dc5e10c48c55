use std::path::Path;

use anyhow::Context;
use prio_core::entities::Task;
use prio_core::lookup::{Repository, TaskIndex, TaskLookup};

use crate::context::AppContext;

/// Read tasks from a JSON array file or a JSONL / concatenated-JSON file.
pub fn read_tasks_file(path: &Path) -> anyhow::Result<Vec<Task>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_tasks(&text).with_context(|| format!("failed to parse tasks from {}", path.display()))
}

pub fn parse_tasks(text: &str) -> anyhow::Result<Vec<Task>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }
    serde_json::Deserializer::from_str(trimmed)
        .into_iter::<Task>()
        .enumerate()
        .map(|(i, record)| record.with_context(|| format!("record {}", i + 1)))
        .collect()
}

/// Tasks a command works on: a stored project or an input file.
///
/// File-backed sets resolve dependencies among themselves; store-backed sets
/// resolve through the store, so cross-project dependencies are found too.
pub struct TaskSet {
    pub tasks: Vec<Task>,
    index: Option<TaskIndex>,
}

impl TaskSet {
    pub fn load(
        ctx: &AppContext,
        project: Option<&str>,
        input: Option<&Path>,
    ) -> anyhow::Result<Self> {
        match (input, project) {
            (Some(path), _) => {
                let tasks = read_tasks_file(path)?;
                let index = TaskIndex::new(&tasks);
                Ok(Self {
                    tasks,
                    index: Some(index),
                })
            }
            (None, Some(project)) => {
                let tasks = ctx
                    .store
                    .fetch_tasks(project)
                    .with_context(|| format!("failed to load project {project}"))?;
                if tasks.is_empty() {
                    tracing::warn!(project, "project has no stored tasks");
                }
                Ok(Self { tasks, index: None })
            }
            (None, None) => anyhow::bail!("either a project or --input is required"),
        }
    }

    pub fn lookup<'a>(&'a self, ctx: &'a AppContext) -> &'a dyn TaskLookup {
        match &self.index {
            Some(index) => index,
            None => &ctx.store,
        }
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}
