//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files, env vars, and working directory.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use prio_config::PrioConfig;
use prio_core::enums::MoscowLabel;

#[test]
fn loads_analysis_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[analysis]
methods = ["RICE", "ROI", "COST_OF_DELAY"]

[analysis.weights]
ROI = 0.5

[analysis.rice]
reach_max = 500.0
risk_penalty = 0.5

[analysis.moscow]
default_label = "should"
"#,
        )?;

        let config: PrioConfig = Figment::from(Serialized::defaults(PrioConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.analysis.methods, vec!["RICE", "ROI", "COST_OF_DELAY"]);
        assert_eq!(config.analysis.weights.get("ROI"), Some(&0.5));
        // Maps merge with defaults rather than replacing them.
        assert_eq!(config.analysis.weights.get("MOSCOW"), Some(&0.7));
        assert_eq!(config.analysis.rice.reach_max, 500.0);
        assert_eq!(config.analysis.rice.risk_penalty, 0.5);
        assert_eq!(config.analysis.rice.default_effort, 1.0);
        assert_eq!(config.analysis.moscow.default_label, MoscowLabel::Should);
        Ok(())
    });
}

#[test]
fn loads_analytics_and_store_sections() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[analytics.trend]
min_points = 5
use_models = false

[analytics.dependency]
max_depth = 2

[engine]
parallel = false

[engine.global_weights]
KANO = 2.0

[store]
data_dir = "/tmp/prio-data"
"#,
        )?;

        let config: PrioConfig = Figment::from(Serialized::defaults(PrioConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.analytics.trend.min_points, 5);
        assert!(!config.analytics.trend.use_models);
        assert_eq!(config.analytics.dependency.max_depth, 2);
        assert_eq!(config.analytics.risk.critical_threshold, 0.75);
        assert!(!config.engine.parallel);
        assert_eq!(config.engine.global_weights.get("KANO"), Some(&2.0));
        assert_eq!(config.store.data_dir, "/tmp/prio-data");
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_from_working_directory() {
    Jail::expect_with(|jail| {
        jail.create_dir(".prio")?;
        jail.create_file(
            ".prio/config.toml",
            r#"
[analysis]
methods = ["WSJF"]
"#,
        )?;

        let config = PrioConfig::load().expect("config loads");
        assert_eq!(config.analysis.methods, vec!["WSJF"]);
        Ok(())
    });
}

#[test]
fn explicit_file_overrides_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".prio")?;
        jail.create_file(".prio/config.toml", "[analysis]\nmethods = [\"WSJF\"]\n")?;
        jail.create_file("custom.toml", "[analysis]\nmethods = [\"ROI\"]\n")?;

        let config =
            PrioConfig::load_from(Some(std::path::Path::new("custom.toml"))).expect("config loads");
        assert_eq!(config.analysis.methods, vec!["ROI"]);
        Ok(())
    });
}

#[test]
fn invalid_weight_in_file_fails_load() {
    Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "[analysis.weights]\nRICE = -2.0\n")?;

        let result = PrioConfig::load_from(Some(std::path::Path::new("bad.toml")));
        assert!(result.is_err());
        Ok(())
    });
}
