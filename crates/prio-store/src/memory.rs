//! In-memory repository.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use prio_core::RepositoryError;
use prio_core::entities::{AnalysisResult, Task};
use prio_core::lookup::{Repository, TaskLookup};

use crate::apply_labels;

#[derive(Debug, Default)]
struct State {
    /// Insertion order is the fetch order.
    tasks: Vec<Task>,
    analyses: Vec<AnalysisResult>,
}

/// Thread-safe, process-local repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RwLock<State>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            state: RwLock::new(State {
                tasks: tasks.into_iter().collect(),
                analyses: Vec::new(),
            }),
        }
    }

    /// Insert or replace a task by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidState`] if the lock is poisoned.
    pub fn upsert(&self, task: Task) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        match state.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => state.tasks.push(task),
        }
        Ok(())
    }

    /// Every analysis saved for `project_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidState`] if the lock is poisoned.
    pub fn analyses(&self, project_id: &str) -> Result<Vec<AnalysisResult>, RepositoryError> {
        Ok(self
            .read()?
            .analyses
            .iter()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect())
    }

    /// Most recently saved analysis for `project_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidState`] if the lock is poisoned.
    pub fn latest_analysis(
        &self,
        project_id: &str,
    ) -> Result<Option<AnalysisResult>, RepositoryError> {
        Ok(self.analyses(project_id)?.pop())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, RepositoryError> {
        self.state
            .read()
            .map_err(|_| RepositoryError::InvalidState("memory repository lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, RepositoryError> {
        self.state
            .write()
            .map_err(|_| RepositoryError::InvalidState("memory repository lock poisoned".into()))
    }
}

impl TaskLookup for MemoryRepository {
    fn lookup(&self, id: &str) -> Option<Task> {
        self.read().ok()?.tasks.iter().find(|t| t.id == id).cloned()
    }
}

impl Repository for MemoryRepository {
    fn fetch_tasks(&self, project_id: &str) -> Result<Vec<Task>, RepositoryError> {
        Ok(self
            .read()?
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    fn save_analysis(&self, result: &AnalysisResult) -> Result<(), RepositoryError> {
        self.write()?.analyses.push(result.clone());
        Ok(())
    }

    fn update_task_labels(
        &self,
        task_id: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "task".into(),
                id: task_id.to_string(),
            })?;
        apply_labels(task, labels);
        Ok(())
    }

    fn update_project_labels(
        &self,
        project_id: &str,
        updates: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        for (task_id, labels) in updates {
            let task = state
                .tasks
                .iter_mut()
                .find(|t| t.project_id == project_id && t.id == *task_id)
                .ok_or_else(|| RepositoryError::NotFound {
                    entity_type: "task".into(),
                    id: format!("{project_id}/{task_id}"),
                })?;
            apply_labels(task, labels);
        }
        Ok(())
    }
}
