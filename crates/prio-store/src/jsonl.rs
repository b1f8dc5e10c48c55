//! JSONL-backed repository.
//!
//! Layout under the data directory:
//!
//! ```text
//! tasks/{project}.jsonl      one Task per line; a later line with the same id wins
//! analyses/{project}.jsonl   one AnalysisResult per run, append-only
//! labels/{project}.jsonl     one LabelUpdate per task, rewritten on every save
//! ```
//!
//! `{project}` is the project id with every byte outside `[A-Za-z0-9_-]`
//! percent-encoded, so distinct ids never share a file.
//!
//! Lines that fail to decode are skipped with a warning so one bad record
//! never hides the rest of a file.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use prio_core::RepositoryError;
use prio_core::entities::{AnalysisResult, Task};
use prio_core::lookup::{Repository, TaskLookup};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::apply_labels;

const TASKS_DIR: &str = "tasks";
const ANALYSES_DIR: &str = "analyses";
const LABELS_DIR: &str = "labels";
const EMPTY_STEM: &str = "%";

/// Accumulated labels of one task within one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelUpdate {
    pub task_id: String,
    pub labels: BTreeMap<String, String>,
    pub ts: DateTime<Utc>,
}

type Index = Arc<HashMap<String, Task>>;
type LookupCache = Arc<RwLock<Option<Index>>>;

/// JSONL store rooted at a data directory.
///
/// Lookups are served from an id index built on first use and dropped by
/// every write through this handle.
#[derive(Debug, Clone)]
pub struct JsonlRepository {
    root: PathBuf,
    cache: LookupCache,
}

impl JsonlRepository {
    /// Open (and create if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Io`] if the directories cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let root = root.into();
        for dir in [TASKS_DIR, ANALYSES_DIR, LABELS_DIR] {
            std::fs::create_dir_all(root.join(dir))?;
        }
        tracing::debug!(root = %root.display(), "opened jsonl repository");
        Ok(Self {
            root,
            cache: LookupCache::default(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Append tasks to their projects' task files.
    ///
    /// Re-importing a task id replaces the earlier record on read.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Io`] if a file write fails.
    pub fn import_tasks(&self, tasks: &[Task]) -> Result<usize, RepositoryError> {
        let mut by_project: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
        for task in tasks {
            by_project.entry(&task.project_id).or_default().push(task);
        }
        for (project_id, batch) in &by_project {
            serde_jsonlines::append_json_lines(self.tasks_path(project_id), batch)?;
            tracing::debug!(project_id, count = batch.len(), "imported tasks");
        }
        self.invalidate();
        Ok(tasks.len())
    }

    /// Every analysis saved for `project_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Io`] if the file exists but cannot be opened.
    pub fn analyses(&self, project_id: &str) -> Result<Vec<AnalysisResult>, RepositoryError> {
        let results: Vec<AnalysisResult> = read_lines(&self.analyses_path(project_id))?;
        Ok(results
            .into_iter()
            .filter(|r| r.project_id == project_id)
            .collect())
    }

    /// Most recently saved analysis for `project_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Io`] if the file exists but cannot be opened.
    pub fn latest_analysis(
        &self,
        project_id: &str,
    ) -> Result<Option<AnalysisResult>, RepositoryError> {
        Ok(self.analyses(project_id)?.pop())
    }

    /// Project ids that have a task file, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Io`] if the tasks directory cannot be listed.
    pub fn projects(&self) -> Result<Vec<String>, RepositoryError> {
        let mut projects = Vec::new();
        for entry in std::fs::read_dir(self.root.join(TASKS_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match decode_stem(stem) {
                Some(project_id) => projects.push(project_id),
                None => tracing::warn!(path = %path.display(), "ignoring foreign task file"),
            }
        }
        projects.sort();
        Ok(projects)
    }

    fn tasks_path(&self, project_id: &str) -> PathBuf {
        project_file(&self.root.join(TASKS_DIR), project_id)
    }

    fn analyses_path(&self, project_id: &str) -> PathBuf {
        project_file(&self.root.join(ANALYSES_DIR), project_id)
    }

    fn labels_path(&self, project_id: &str) -> PathBuf {
        project_file(&self.root.join(LABELS_DIR), project_id)
    }

    /// Tasks of one project, de-duplicated by id (first position, last record).
    fn load_project(&self, project_id: &str) -> Result<Vec<Task>, RepositoryError> {
        let records: Vec<Task> = read_lines(&self.tasks_path(project_id))?;
        let mut order: Vec<Task> = Vec::with_capacity(records.len());
        let mut slots: HashMap<String, usize> = HashMap::new();
        for task in records {
            if task.project_id != project_id {
                tracing::warn!(
                    project_id,
                    task_id = %task.id,
                    found = %task.project_id,
                    "skipping task filed under another project"
                );
                continue;
            }
            match slots.get(&task.id) {
                Some(&i) => order[i] = task,
                None => {
                    slots.insert(task.id.clone(), order.len());
                    order.push(task);
                }
            }
        }
        Ok(order)
    }

    /// Labels stored for one project, merged per task in write order.
    fn load_labels(
        &self,
        project_id: &str,
    ) -> Result<BTreeMap<String, LabelUpdate>, RepositoryError> {
        let updates: Vec<LabelUpdate> = read_lines(&self.labels_path(project_id))?;
        let mut merged: BTreeMap<String, LabelUpdate> = BTreeMap::new();
        for update in updates {
            match merged.get_mut(&update.task_id) {
                Some(existing) => {
                    existing.labels.extend(update.labels);
                    existing.ts = update.ts;
                }
                None => {
                    merged.insert(update.task_id.clone(), update);
                }
            }
        }
        Ok(merged)
    }

    fn labelled_project(&self, project_id: &str) -> Result<Vec<Task>, RepositoryError> {
        let mut tasks = self.load_project(project_id)?;
        let labels = self.load_labels(project_id)?;
        if !labels.is_empty() {
            for task in &mut tasks {
                if let Some(update) = labels.get(&task.id) {
                    apply_labels(task, &update.labels);
                }
            }
        }
        Ok(tasks)
    }

    /// Id index over every project. On duplicate ids the first project in
    /// sorted order wins.
    fn index(&self) -> Result<Index, RepositoryError> {
        if let Some(index) = self.read_cache()?.as_ref() {
            return Ok(Arc::clone(index));
        }
        let mut index = HashMap::new();
        for project_id in self.projects()? {
            for task in self.labelled_project(&project_id)? {
                index.entry(task.id.clone()).or_insert(task);
            }
        }
        tracing::debug!(tasks = index.len(), "built task index");
        let index = Arc::new(index);
        *self.write_cache()? = Some(Arc::clone(&index));
        Ok(index)
    }

    fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.write() {
            *cache = None;
        }
    }

    fn read_cache(&self) -> Result<RwLockReadGuard<'_, Option<Index>>, RepositoryError> {
        self.cache
            .read()
            .map_err(|_| RepositoryError::InvalidState("jsonl index lock poisoned".into()))
    }

    fn write_cache(&self) -> Result<RwLockWriteGuard<'_, Option<Index>>, RepositoryError> {
        self.cache
            .write()
            .map_err(|_| RepositoryError::InvalidState("jsonl index lock poisoned".into()))
    }
}

impl TaskLookup for JsonlRepository {
    fn lookup(&self, id: &str) -> Option<Task> {
        match self.index() {
            Ok(index) => index.get(id).cloned(),
            Err(e) => {
                tracing::warn!(task_id = id, error = %e, "task lookup failed");
                None
            }
        }
    }
}

impl Repository for JsonlRepository {
    fn fetch_tasks(&self, project_id: &str) -> Result<Vec<Task>, RepositoryError> {
        self.labelled_project(project_id)
    }

    fn save_analysis(&self, result: &AnalysisResult) -> Result<(), RepositoryError> {
        serde_jsonlines::append_json_lines(self.analyses_path(&result.project_id), [result])?;
        tracing::debug!(
            project_id = %result.project_id,
            tasks = result.tasks.len(),
            "saved analysis"
        );
        Ok(())
    }

    fn update_task_labels(
        &self,
        task_id: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<(), RepositoryError> {
        let project_id = self
            .index()?
            .get(task_id)
            .map(|task| task.project_id.clone())
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "task".into(),
                id: task_id.to_string(),
            })?;
        let updates = BTreeMap::from([(task_id.to_string(), labels.clone())]);
        self.update_project_labels(&project_id, &updates)
    }

    /// Merge the updates into the project's label file and rewrite it with
    /// one line per task.
    fn update_project_labels(
        &self,
        project_id: &str,
        updates: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<(), RepositoryError> {
        if updates.is_empty() {
            return Ok(());
        }
        let mut merged = self.load_labels(project_id)?;
        let ts = Utc::now();
        for (task_id, labels) in updates {
            let entry = merged
                .entry(task_id.clone())
                .or_insert_with(|| LabelUpdate {
                    task_id: task_id.clone(),
                    labels: BTreeMap::new(),
                    ts,
                });
            entry.labels.extend(labels.clone());
            entry.ts = ts;
        }

        let path = self.labels_path(project_id);
        let staged = path.with_extension("jsonl.tmp");
        serde_jsonlines::write_json_lines(&staged, merged.values())?;
        std::fs::rename(&staged, &path)?;
        self.invalidate();
        tracing::debug!(project_id, tasks = updates.len(), "saved labels");
        Ok(())
    }
}

/// Decode every line of `path`; a missing file reads as empty.
fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RepositoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for (line, record) in serde_jsonlines::json_lines::<T, _>(path)?.enumerate() {
        match record {
            Ok(value) => out.push(value),
            Err(e) => tracing::warn!(
                path = %path.display(),
                line = line + 1,
                error = %e,
                "skipping unreadable record"
            ),
        }
    }
    Ok(out)
}

fn project_file(dir: &Path, project_id: &str) -> PathBuf {
    dir.join(format!("{}.jsonl", encode_stem(project_id)))
}

/// Percent-encode a project id into a file stem that stays inside its
/// directory. Distinct ids always yield distinct stems.
fn encode_stem(project_id: &str) -> String {
    if project_id.is_empty() {
        return EMPTY_STEM.to_string();
    }
    let mut stem = String::with_capacity(project_id.len());
    for byte in project_id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') {
            stem.push(char::from(byte));
        } else {
            let _ = write!(stem, "%{byte:02X}");
        }
    }
    stem
}

/// Inverse of [`encode_stem`]; `None` for names it could not have produced.
fn decode_stem(stem: &str) -> Option<String> {
    if stem == EMPTY_STEM {
        return Some(String::new());
    }
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = stem.get(i + 1..i + 3)?;
                if !hex.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)) {
                    return None;
                }
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            byte if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') => {
                out.push(byte);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(out).ok()
}
