//! # prio-scoring
//!
//! Multi-method priority scoring for Prio.
//!
//! Every method implements [`ScoringAgent`]: a pure function of a task and the
//! per-call [`AnalysisConfig`](prio_core::config::AnalysisConfig) returning a
//! raw score, an audit trail of intermediate values, and categorical labels.
//! The [`PriorityOrchestrator`] runs the configured methods, tolerates
//! individual failures, min-max normalizes the survivors and blends them with
//! layered weights. [`analyze_project`] drives a whole project through a
//! [`Repository`](prio_core::lookup::Repository).
//!
//! ```
//! use prio_core::config::AnalysisConfig;
//! use prio_core::entities::Task;
//! use prio_scoring::PriorityOrchestrator;
//!
//! let task = Task::new("T-1", "demo", "Checkout revamp")
//!     .with_reach(8000.0)
//!     .with_impact(2.0)
//!     .with_confidence(0.8)
//!     .with_effort(5.0);
//! let config = AnalysisConfig::with_methods(["RICE"]);
//! let report = PriorityOrchestrator::new().analyze(&task, &config, None);
//! assert_eq!(report.weighted_score(), Some(0.5));
//! ```

pub mod agent;
pub mod agents;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod strategic;

pub use agent::{ScoringAgent, Scored};
pub use agents::agent_for;
pub use error::ScoringError;
pub use orchestrator::{
    Aggregate, MethodOutcome, PriorityOrchestrator, PriorityReport, RankedTask, Snapshot,
};
pub use pipeline::analyze_project;
