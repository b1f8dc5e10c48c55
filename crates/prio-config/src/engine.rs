//! Engine-wide scoring settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const fn default_parallel() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Orchestrator-level weight multipliers, applied after per-call weights
    /// and user overrides.
    #[serde(default)]
    pub global_weights: BTreeMap<String, f64>,

    /// Score task batches on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            global_weights: BTreeMap::new(),
            parallel: default_parallel(),
        }
    }
}
