//! Scoring error types for prio-scoring.

use prio_core::RepositoryError;
use prio_core::enums::Method;

/// Errors raised while scoring tasks or running a project analysis.
///
/// Per-method failures are caught by the orchestrator and recorded against
/// the method; only repository failures escape a project run.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// An agent rejected its input.
    #[error("{method} cannot score task '{task_id}': {reason}")]
    InvalidInput {
        method: Method,
        task_id: String,
        reason: String,
    },

    /// An agent failed while computing its score.
    #[error("{method} failed: {message}")]
    Agent { method: Method, message: String },

    /// An agent panicked; the panic was contained.
    #[error("{method} panicked: {message}")]
    Panicked { method: Method, message: String },

    /// Error from the task repository.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
