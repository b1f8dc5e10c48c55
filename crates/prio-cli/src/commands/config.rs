use anyhow::Context;
use prio_config::PrioConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ConfigArgs;
use crate::output::output;

pub fn handle(args: &ConfigArgs, config: &PrioConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.toml {
        println!("{}", to_toml(config)?);
        return Ok(());
    }
    output(config, flags.format)
}

fn to_toml(config: &PrioConfig) -> anyhow::Result<String> {
    toml::to_string_pretty(config).context("failed to render configuration as TOML")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_render_as_toml_that_reads_back() {
        let config = PrioConfig::default();
        let rendered = to_toml(&config).expect("render");
        assert!(rendered.contains("[analysis]"));
        assert!(rendered.contains("[store]"));
        let parsed: PrioConfig = toml::from_str(&rendered).expect("parse");
        assert_eq!(parsed.store, config.store);
        assert_eq!(parsed.analysis.methods, config.analysis.methods);
    }
}
