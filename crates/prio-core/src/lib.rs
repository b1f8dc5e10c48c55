//! # prio-core
//!
//! Core types, metadata accessors, and error types for Prio.
//!
//! This crate provides the foundational types shared across all Prio crates:
//! - Entity structs for tasks and analysis artifacts
//! - The closed set of scoring methods and the categorical label enums
//! - Per-method and analytics sub-configurations with their defaults
//! - The lenient metadata bag with parse-or-default accessors
//! - Numeric helpers (clamping, normalization, PERT)
//! - The read-only task lookup and repository seams
//! - Cross-cutting error types

pub mod config;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod lookup;
pub mod metadata;
pub mod numeric;

pub use config::{AnalysisConfig, AnalyticsConfig};
pub use entities::{AnalysisResult, Details, Labels, MethodScore, Task, TaskAnalysis};
pub use enums::Method;
pub use errors::{CoreError, RepositoryError};
pub use lookup::{Repository, TaskIndex, TaskLookup};
pub use metadata::Metadata;
