use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{GlobalFlags, OutputFormat};

/// Narrowest terminal the table renderer will try to fit.
const MIN_TERM_WIDTH: usize = 40;

/// How tables are drawn for this run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiPrefs {
    /// Paint priority buckets, risk levels and forecast tiers.
    pub table_color: bool,
    pub term_width: Option<usize>,
}

impl UiPrefs {
    /// Resolve preferences from flags and the environment.
    ///
    /// `PRIO_COLOR=always|never` overrides terminal detection. `NO_COLOR`
    /// and `--quiet` always win, and only table output is ever colored.
    pub fn resolve(
        flags: &GlobalFlags,
        stdout_is_tty: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let wants_color = match env("PRIO_COLOR").as_deref().map(str::trim) {
            Some("always") => true,
            Some("never") => false,
            _ => stdout_is_tty,
        };
        let table_color = wants_color
            && flags.format == OutputFormat::Table
            && !flags.quiet
            && env("NO_COLOR").is_none();

        let term_width = env("COLUMNS")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|width| *width >= MIN_TERM_WIDTH);

        Self {
            table_color,
            term_width,
        }
    }
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let prefs = UiPrefs::resolve(flags, std::io::stdout().is_terminal(), |key| {
        std::env::var(key).ok()
    });
    tracing::debug!(?prefs, "ui preferences");
    let _ = UI_PREFS.set(prefs);
}

#[must_use]
pub fn prefs() -> UiPrefs {
    UI_PREFS.get().copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn flags(format: OutputFormat, quiet: bool) -> GlobalFlags {
        GlobalFlags {
            format,
            limit: None,
            quiet,
            config: None,
            data_dir: None,
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn tables_on_a_terminal_are_colored() {
        let prefs = UiPrefs::resolve(&flags(OutputFormat::Table, false), true, env(&[]));
        assert!(prefs.table_color);
        assert_eq!(prefs.term_width, None);
    }

    #[test]
    fn json_and_quiet_runs_are_never_colored() {
        let always = env(&[("PRIO_COLOR", "always")]);
        assert!(!UiPrefs::resolve(&flags(OutputFormat::Json, false), true, &always).table_color);
        assert!(!UiPrefs::resolve(&flags(OutputFormat::Table, true), true, &always).table_color);
    }

    #[test]
    fn prio_color_overrides_detection_but_not_no_color() {
        let table = flags(OutputFormat::Table, false);
        assert!(UiPrefs::resolve(&table, false, env(&[("PRIO_COLOR", "always")])).table_color);
        assert!(!UiPrefs::resolve(&table, true, env(&[("PRIO_COLOR", "never")])).table_color);
        let both = env(&[("PRIO_COLOR", "always"), ("NO_COLOR", "1")]);
        assert!(!UiPrefs::resolve(&table, true, both).table_color);
    }

    #[test]
    fn tiny_or_garbled_widths_are_ignored() {
        let table = flags(OutputFormat::Table, false);
        assert_eq!(
            UiPrefs::resolve(&table, false, env(&[("COLUMNS", "120")])).term_width,
            Some(120)
        );
        assert_eq!(UiPrefs::resolve(&table, false, env(&[("COLUMNS", "20")])).term_width, None);
        assert_eq!(UiPrefs::resolve(&table, false, env(&[("COLUMNS", "wide")])).term_width, None);
    }
}
