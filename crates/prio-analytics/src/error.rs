use thiserror::Error;

/// Failures of the numerical fits behind trend and effort forecasting.
///
/// These never leave the crate's public agents: a failed fit makes the caller
/// fall through to a simpler model or tier.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("{model} needs at least {needed} points, got {got}")]
    InsufficientData {
        model: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("{model}: degenerate input ({reason})")]
    Degenerate {
        model: &'static str,
        reason: &'static str,
    },

    #[error("{model} produced a non-finite result")]
    NonFinite { model: &'static str },
}
