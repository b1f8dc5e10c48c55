//! Read-only task lookup and the repository seam.
//!
//! Agents that walk the dependency graph receive a [`TaskLookup`]; the
//! project-level entry point talks to a [`Repository`]. Concrete storage lives
//! in `prio-store`.

use std::collections::{BTreeMap, HashMap};

use crate::entities::{AnalysisResult, Task};
use crate::errors::RepositoryError;

/// Resolve a task by id. Returns `None` for unknown ids.
pub trait TaskLookup: Sync {
    fn lookup(&self, id: &str) -> Option<Task>;
}

impl<F> TaskLookup for F
where
    F: Fn(&str) -> Option<Task> + Sync,
{
    fn lookup(&self, id: &str) -> Option<Task> {
        self(id)
    }
}

/// In-memory id index over a task slice.
#[derive(Debug, Clone, Default)]
pub struct TaskIndex {
    tasks: HashMap<String, Task>,
}

impl TaskIndex {
    #[must_use]
    pub fn new(tasks: &[Task]) -> Self {
        Self {
            tasks: tasks.iter().map(|t| (t.id.clone(), t.clone())).collect(),
        }
    }

    pub fn insert(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskLookup for TaskIndex {
    fn lookup(&self, id: &str) -> Option<Task> {
        self.tasks.get(id).cloned()
    }
}

/// Task storage and analysis sink used by project-level analysis.
pub trait Repository: TaskLookup {
    /// All tasks belonging to `project_id`, in stored order.
    fn fetch_tasks(&self, project_id: &str) -> Result<Vec<Task>, RepositoryError>;

    /// Persist a completed project analysis.
    fn save_analysis(&self, result: &AnalysisResult) -> Result<(), RepositoryError>;

    /// Merge `labels` into the task's metadata (string values, existing keys
    /// overwritten).
    fn update_task_labels(
        &self,
        task_id: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<(), RepositoryError>;

    /// Merge labels into several tasks of `project_id`, keyed by task id.
    ///
    /// Backends that key labels by project override this; the default goes
    /// through [`Repository::update_task_labels`] one task at a time.
    fn update_project_labels(
        &self,
        project_id: &str,
        updates: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<(), RepositoryError> {
        let _ = project_id;
        for (task_id, labels) in updates {
            self.update_task_labels(task_id, labels)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_resolves_known_ids_only() {
        let index = TaskIndex::new(&[Task::new("a", "p", "A"), Task::new("b", "p", "B")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("a").map(|t| t.title), Some("A".to_string()));
        assert!(index.lookup("zzz").is_none());
    }

    #[test]
    fn closures_are_lookups() {
        let lookup = |id: &str| (id == "x").then(|| Task::new("x", "p", "X"));
        assert!(lookup.lookup("x").is_some());
        assert!(lookup.lookup("y").is_none());
    }
}
