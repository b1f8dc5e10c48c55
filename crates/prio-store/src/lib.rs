//! # prio-store
//!
//! Repository implementations for Prio.
//!
//! - [`MemoryRepository`]: process-local storage for tests and one-shot runs.
//! - [`JsonlRepository`]: append-only JSONL files under a data directory.
//!   Tasks live in `tasks/{project}.jsonl`, analyses are appended to
//!   `analyses/{project}.jsonl`, and labels are kept per task in
//!   `labels/{project}.jsonl` and merged onto tasks whenever they are read.

mod jsonl;
mod memory;

pub use jsonl::{JsonlRepository, LabelUpdate};
pub use memory::MemoryRepository;

use std::collections::BTreeMap;

use prio_core::entities::Task;

/// Merge labels into task metadata as string values.
fn apply_labels(task: &mut Task, labels: &BTreeMap<String, String>) {
    for (key, value) in labels {
        task.metadata.insert(key.clone(), value.clone());
    }
}
