//! On-disk repository location.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_data_dir() -> String {
    ".prio/data".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Directory holding `tasks.jsonl` and `analyses.jsonl`. Relative paths
    /// resolve against the working directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        Path::new(&self.data_dir).to_path_buf()
    }
}
