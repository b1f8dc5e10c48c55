//! # prio-config
//!
//! Layered configuration loading for Prio using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PRIO_*` prefix, `__` as separator)
//! 2. An explicit file passed with `--config`
//! 3. Project-level `.prio/config.toml`
//! 4. User-level `~/.config/prio/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PRIO_ANALYSIS__RICE__REACH_MAX` -> `analysis.rice.reach_max`,
//! `PRIO_ENGINE__PARALLEL` -> `engine.parallel`, etc. The `__` (double
//! underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use prio_config::PrioConfig;
//!
//! let config = PrioConfig::load_with_dotenv().expect("config");
//! println!("methods: {:?}", config.analysis.methods);
//! ```

mod engine;
mod error;
mod store;

pub use engine::EngineConfig;
pub use error::ConfigError;
pub use store::StoreConfig;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use prio_core::config::{AnalysisConfig, AnalyticsConfig};
use prio_core::enums::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PrioConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl PrioConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load with an extra TOML file layered above the project config.
    pub fn load_from(extra: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_with(extra).extract()?;
        config.finish()
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_with_dotenv_from(None)
    }

    /// [`Self::load_from`] with `.env` support.
    pub fn load_with_dotenv_from(extra: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load_from(extra)
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        Self::figment_with(None)
    }

    /// Build the provider chain with an optional explicit file.
    pub fn figment_with(extra: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".prio/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        if let Some(path) = extra {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("PRIO_").split("__"))
    }

    /// Canonicalize method-keyed maps and reject invalid values.
    fn finish(mut self) -> Result<Self, ConfigError> {
        canonicalize_method_keys(&mut self.analysis.weights);
        canonicalize_method_keys(&mut self.analysis.user_overrides);
        canonicalize_method_keys(&mut self.engine.global_weights);
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges that would otherwise silently distort scores.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let maps = [
            ("analysis.weights", &self.analysis.weights),
            ("analysis.user_overrides", &self.analysis.user_overrides),
            ("engine.global_weights", &self.engine.global_weights),
        ];
        for (table, map) in maps {
            if let Some((method, weight)) = map.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
                return Err(ConfigError::InvalidWeight {
                    table,
                    method: method.clone(),
                    weight: *weight,
                });
            }
        }

        for name in &self.analysis.methods {
            if name.parse::<Method>().is_err() {
                tracing::warn!(method = %name, "config names an unknown scoring method; it will be skipped");
            }
        }

        let alpha = self.analytics.effort.alpha;
        if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(ConfigError::AlphaOutOfRange { alpha });
        }

        if self.store.data_dir.trim().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }

        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("prio").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current dir.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

/// Rewrite keys that name a method to its canonical spelling.
///
/// Environment variables arrive lowercased (`rice`) while defaults use `RICE`;
/// a non-canonical key always comes from a higher layer, so it wins.
fn canonicalize_method_keys(map: &mut BTreeMap<String, f64>) {
    let mut canonical = BTreeMap::new();
    let mut overrides = Vec::new();
    for (name, weight) in std::mem::take(map) {
        match name.parse::<Method>() {
            Ok(method) if method.as_str() == name => {
                canonical.insert(name, weight);
            }
            Ok(method) => overrides.push((method.as_str().to_string(), weight)),
            Err(_) => {
                canonical.insert(name, weight);
            }
        }
    }
    canonical.extend(overrides);
    *map = canonical;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = PrioConfig::default();
        assert_eq!(config.analysis.methods, vec!["RICE", "KANO", "MOSCOW", "WSJF"]);
        assert!(config.engine.parallel);
        assert_eq!(config.store.data_dir, ".prio/data");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: PrioConfig = PrioConfig::figment().extract()?;
            assert_eq!(config.analysis.weights.get("MOSCOW"), Some(&0.7));
            assert_eq!(config.analytics.dependency.max_depth, 5);
            Ok(())
        });
    }

    #[test]
    fn lowercase_keys_override_canonical_ones() {
        let mut map = BTreeMap::from([
            ("RICE".to_string(), 1.0),
            ("rice".to_string(), 2.0),
            ("custom".to_string(), 3.0),
        ]);
        canonicalize_method_keys(&mut map);
        assert_eq!(map.get("RICE"), Some(&2.0));
        assert!(!map.contains_key("rice"));
        assert_eq!(map.get("custom"), Some(&3.0));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut config = PrioConfig::default();
        config.analysis.weights.insert("ROI".into(), -1.0);
        let err = config.validate().unwrap_err();
        assert_eq!(err.key().as_deref(), Some("analysis.weights.ROI"));
    }

    #[test]
    fn alpha_out_of_range_is_rejected() {
        let mut config = PrioConfig::default();
        config.analytics.effort.alpha = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AlphaOutOfRange { alpha }) if alpha == 1.5
        ));
    }
}
