//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed to parse, or a value has the wrong type.
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    /// A method weight that would distort the weighted blend.
    #[error("weight {table}.{method} must be a finite non-negative number, got {weight}")]
    InvalidWeight {
        table: &'static str,
        method: String,
        weight: f64,
    },

    /// The forecast confidence level is outside `(0, 1)`.
    #[error("analytics.effort.alpha must lie strictly between 0 and 1, got {alpha}")]
    AlphaOutOfRange { alpha: f64 },

    #[error("store.data_dir must not be empty")]
    EmptyDataDir,
}

impl ConfigError {
    /// Dotted key of the offending setting, when one is known.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Load(error) if error.path.is_empty() => None,
            Self::Load(error) => Some(error.path.join(".")),
            Self::InvalidWeight { table, method, .. } => Some(format!("{table}.{method}")),
            Self::AlphaOutOfRange { .. } => Some("analytics.effort.alpha".to_string()),
            Self::EmptyDataDir => Some("store.data_dir".to_string()),
        }
    }
}
