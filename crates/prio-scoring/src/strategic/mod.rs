//! Strategic agents: goal alignment, impact mapping, cost of delay, ROI.
//!
//! Impact mapping is the only agent here that reads through the task lookup.

pub mod cost_of_delay;
pub mod impact_mapping;
pub mod purpose_alignment;
pub mod roi;

pub use cost_of_delay::CostOfDelay;
pub use impact_mapping::ImpactMapping;
pub use purpose_alignment::PurposeAlignment;
pub use roi::Roi;
