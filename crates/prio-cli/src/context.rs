use std::path::Path;

use anyhow::Context;
use prio_analytics::AnalyticsAggregator;
use prio_config::PrioConfig;
use prio_core::config::AnalysisConfig;
use prio_scoring::PriorityOrchestrator;
use prio_store::JsonlRepository;

/// Loaded configuration plus the opened store, shared by every command.
#[derive(Debug)]
pub struct AppContext {
    pub config: PrioConfig,
    pub store: JsonlRepository,
}

impl AppContext {
    /// Open the store under `data_dir`, falling back to `store.data_dir`.
    pub fn init(config: PrioConfig, data_dir: Option<&Path>) -> anyhow::Result<Self> {
        let root = data_dir.map_or_else(|| config.store.data_path(), Path::to_path_buf);
        let store = JsonlRepository::open(&root)
            .with_context(|| format!("failed to open data directory {}", root.display()))?;
        tracing::debug!(root = %root.display(), "store ready");
        Ok(Self { config, store })
    }

    /// Orchestrator carrying the engine-level weights and parallelism.
    #[must_use]
    pub fn orchestrator(&self) -> PriorityOrchestrator {
        PriorityOrchestrator::new()
            .with_global_weights(&self.config.engine.global_weights)
            .with_parallel(self.config.engine.parallel)
    }

    #[must_use]
    pub fn aggregator(&self) -> AnalyticsAggregator {
        AnalyticsAggregator::new(self.config.analytics.clone())
            .with_parallel(self.config.engine.parallel)
    }

    /// Configured analysis settings, with `methods` replaced when non-empty.
    #[must_use]
    pub fn analysis_config(&self, methods: &[String]) -> AnalysisConfig {
        let mut config = self.config.analysis.clone();
        if !methods.is_empty() {
            config.methods = methods.to_vec();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_data_dir_wins_and_is_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("data");
        let ctx = AppContext::init(PrioConfig::default(), Some(&root)).expect("init");
        assert_eq!(ctx.store.root(), root.as_path());
        assert!(root.join("tasks").is_dir());
    }

    #[test]
    fn method_override_replaces_configured_methods() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = AppContext::init(PrioConfig::default(), Some(dir.path())).expect("init");
        let defaults = ctx.analysis_config(&[]);
        assert_eq!(defaults.methods, ctx.config.analysis.methods);
        let only_rice = ctx.analysis_config(&["RICE".to_string()]);
        assert_eq!(only_rice.methods, vec!["RICE".to_string()]);
    }
}
