//! Entity structs for Prio domain objects.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` so the
//! produced analysis artifact can be persisted and validated.

mod analysis;
mod task;

pub use analysis::{AnalysisResult, Details, Labels, MethodScore, TaskAnalysis};
pub use task::{
    DEPENDENCY_LABEL_KEY, EffortEstimate, EffortSource, FORECAST_EFFORT_KEY, FORECAST_SOURCE_KEY,
    RISK_SCORE_KEY, Task,
};
