//! Built-in scoring agents and the fixed method → agent dispatch table.

pub mod kano;
pub mod moscow;
pub mod opportunity;
pub mod rice;
pub mod stack_ranking;
pub mod value_effort;
pub mod wsjf;

pub use kano::Kano;
pub use moscow::Moscow;
pub use opportunity::Opportunity;
pub use rice::Rice;
pub use stack_ranking::StackRanking;
pub use value_effort::ValueEffort;
pub use wsjf::Wsjf;

use prio_core::enums::Method;
use prio_core::metadata::Metadata;

use crate::agent::ScoringAgent;
use crate::strategic::{CostOfDelay, ImpactMapping, PurposeAlignment, Roi};

/// Lower bound applied to effort / job size before dividing.
pub const EFFORT_FLOOR: f64 = 1e-6;

/// The agent implementing `method`.
#[must_use]
pub fn agent_for(method: Method) -> &'static dyn ScoringAgent {
    match method {
        Method::Rice => &Rice,
        Method::Wsjf => &Wsjf,
        Method::Kano => &Kano,
        Method::Moscow => &Moscow,
        Method::ValueEffort => &ValueEffort,
        Method::Opportunity => &Opportunity,
        Method::StackRanking => &StackRanking,
        Method::PurposeAlignment => &PurposeAlignment,
        Method::ImpactMapping => &ImpactMapping,
        Method::CostOfDelay => &CostOfDelay,
        Method::Roi => &Roi,
    }
}

/// Numeric flag in `[0, 1]`-ish form: a parsed number, else 1/0 truthiness.
pub(crate) fn flag_value(meta: &Metadata, key: &str) -> f64 {
    meta.number(key)
        .unwrap_or_else(|| if meta.flag(key) { 1.0 } else { 0.0 })
}
