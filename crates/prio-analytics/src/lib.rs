//! # prio-analytics
//!
//! Analytics agents that complement priority scoring:
//!
//! - [`trend`]: direction and strength of a task's value history
//! - [`risk`]: delivery risk from probability, failures and dependencies
//! - [`dependency`]: dependency graph, cycles, topological order, critical path
//! - [`effort`]: PERT, history and fallback effort forecasting
//! - [`forensic`]: retrospective over completed tasks
//! - [`aggregator`]: runs all of the above and summarizes
//!
//! Numerical fits live in [`stats`]; a fit failure never escapes an agent,
//! it makes the agent fall back to a simpler model or tier.

pub mod aggregator;
pub mod dependency;
pub mod effort;
pub mod error;
pub mod forensic;
pub mod risk;
pub mod series;
pub mod stats;
pub mod trend;

pub use aggregator::{AnalyticsAggregator, AnalyticsReport, ProjectAnalytics, ProjectSummary, Summary};
pub use dependency::{DependencyGraph, DependencyReport};
pub use effort::{EffortForecast, ForecastPoint};
pub use error::AnalyticsError;
pub use forensic::ForensicReport;
pub use risk::RiskReport;
pub use trend::TrendReport;
