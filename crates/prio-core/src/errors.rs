//! Cross-cutting error types for Prio.
//!
//! Scoring and analytics errors live in their own crates. Missing or malformed
//! task metadata is never an error: consumers substitute documented defaults.

use thiserror::Error;

/// Errors that can be raised by any Prio crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A method name did not match any known scoring method.
    #[error("Unknown scoring method: {0}")]
    UnknownMethod(String),

    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors surfaced by a [`Repository`](crate::lookup::Repository) backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested project or task does not exist.
    #[error("Not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Reading or writing the backing storage failed.
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend is in a state it cannot recover from (e.g. poisoned lock).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
