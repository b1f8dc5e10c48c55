//! Scoring methods and categorical label enums for Prio.
//!
//! Scoring methods serialize with their wire names (`RICE`, `VALUE_EFFORT`, ...).
//! Label enums expose `as_str()` returning the exact string written into a
//! task's label map, so consumers can match on stable values.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// The closed set of scoring methods the orchestrator can dispatch to.
///
/// Adding a method is a compile-time change: a new variant here plus an agent
/// in `prio-scoring`'s dispatch table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Method {
    Rice,
    Wsjf,
    Kano,
    Moscow,
    ValueEffort,
    Opportunity,
    StackRanking,
    PurposeAlignment,
    ImpactMapping,
    CostOfDelay,
    Roi,
}

impl Method {
    /// Every method, core agents first, then strategic agents.
    pub const ALL: [Self; 11] = [
        Self::Rice,
        Self::Wsjf,
        Self::Kano,
        Self::Moscow,
        Self::ValueEffort,
        Self::Opportunity,
        Self::StackRanking,
        Self::PurposeAlignment,
        Self::ImpactMapping,
        Self::CostOfDelay,
        Self::Roi,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rice => "RICE",
            Self::Wsjf => "WSJF",
            Self::Kano => "KANO",
            Self::Moscow => "MOSCOW",
            Self::ValueEffort => "VALUE_EFFORT",
            Self::Opportunity => "OPPORTUNITY",
            Self::StackRanking => "STACK_RANKING",
            Self::PurposeAlignment => "PURPOSE_ALIGNMENT",
            Self::ImpactMapping => "IMPACT_MAPPING",
            Self::CostOfDelay => "COST_OF_DELAY",
            Self::Roi => "ROI",
        }
    }

    /// Whether the method belongs to the strategic family (may consult a lookup).
    #[must_use]
    pub const fn is_strategic(self) -> bool {
        matches!(
            self,
            Self::PurposeAlignment | Self::ImpactMapping | Self::CostOfDelay | Self::Roi
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CoreError;

    /// Case-insensitive; `-` and spaces are treated as `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        let method = match normalized.as_str() {
            "RICE" => Self::Rice,
            "WSJF" => Self::Wsjf,
            "KANO" => Self::Kano,
            "MOSCOW" => Self::Moscow,
            "VALUE_EFFORT" | "VALUE_VS_EFFORT" => Self::ValueEffort,
            "OPPORTUNITY" | "OPPORTUNITY_SCORING" => Self::Opportunity,
            "STACK_RANKING" => Self::StackRanking,
            "PURPOSE_ALIGNMENT" => Self::PurposeAlignment,
            "IMPACT_MAPPING" => Self::ImpactMapping,
            "COST_OF_DELAY" | "COD" => Self::CostOfDelay,
            "ROI" => Self::Roi,
            _ => return Err(CoreError::UnknownMethod(s.to_string())),
        };
        Ok(method)
    }
}

// ---------------------------------------------------------------------------
// Bucket
// ---------------------------------------------------------------------------

/// Three-way HIGH / MEDIUM / LOW bucket shared by most numeric methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bucket {
    High,
    Medium,
    Low,
}

impl Bucket {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// KanoCategory
// ---------------------------------------------------------------------------

/// Kano classification of a feature's satisfaction effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KanoCategory {
    MustBe,
    Performance,
    Attractive,
    Indifferent,
    Reverse,
    Questionable,
}

impl KanoCategory {
    /// Category order used for tallies and majority tie-breaks.
    pub const ALL: [Self; 6] = [
        Self::MustBe,
        Self::Performance,
        Self::Attractive,
        Self::Indifferent,
        Self::Reverse,
        Self::Questionable,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MustBe => "must_be",
            Self::Performance => "performance",
            Self::Attractive => "attractive",
            Self::Indifferent => "indifferent",
            Self::Reverse => "reverse",
            Self::Questionable => "questionable",
        }
    }
}

impl fmt::Display for KanoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MoscowLabel
// ---------------------------------------------------------------------------

/// MoSCoW label attached to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MoscowLabel {
    Must,
    Should,
    Could,
    Wont,
}

impl MoscowLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Must => "must",
            Self::Should => "should",
            Self::Could => "could",
            Self::Wont => "wont",
        }
    }

    /// Lenient parse of free-form labels such as `"Must have"` or `"won't"`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        let head = lowered
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .next()
            .unwrap_or("");
        match head.replace('\'', "").as_str() {
            "must" | "m" => Some(Self::Must),
            "should" | "s" => Some(Self::Should),
            "could" | "c" => Some(Self::Could),
            "wont" | "w" | "will" => Some(Self::Wont),
            _ => None,
        }
    }
}

impl fmt::Display for MoscowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Strategic labels
// ---------------------------------------------------------------------------

/// Purpose-alignment verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Aligned,
    Misaligned,
}

impl Alignment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aligned => "aligned",
            Self::Misaligned => "misaligned",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Breadth of a task's mapped impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactBreadth {
    Broad,
    Medium,
    Narrow,
}

impl ImpactBreadth {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Broad => "BROAD",
            Self::Medium => "MEDIUM",
            Self::Narrow => "NARROW",
        }
    }
}

impl fmt::Display for ImpactBreadth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cost-of-delay urgency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DelayCost {
    Critical,
    High,
    Moderate,
    Low,
}

impl DelayCost {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Moderate => "MODERATE",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for DelayCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Analytics labels
// ---------------------------------------------------------------------------

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Flat => "FLAT",
        }
    }

    /// Direction from the sign of a slope; exactly zero (or NaN) is flat.
    #[must_use]
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            Self::Up
        } else if slope < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk level bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which effort-forecast tier produced the estimate.
///
/// ```text
/// PERT → HISTORY → FALLBACK   (first applicable wins)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastTier {
    Pert,
    History,
    Fallback,
}

impl ForecastTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pert => "PERT",
            Self::History => "HISTORY",
            Self::Fallback => "FALLBACK",
        }
    }
}

impl fmt::Display for ForecastTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a task's dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyLabel {
    Cycle,
    Complex,
    Simple,
}

impl DependencyLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cycle => "CYCLE",
            Self::Complex => "COMPLEX",
            Self::Simple => "SIMPLE",
        }
    }
}

impl fmt::Display for DependencyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a forensic retrospective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForensicLevel {
    Critical,
    High,
    Ok,
    /// No history was supplied.
    Empty,
}

impl ForensicLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Ok => "OK",
            Self::Empty => "EMPTY",
        }
    }
}

impl fmt::Display for ForensicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
