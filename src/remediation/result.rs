//! Final result types

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::CostRange;
use crate::safety::Urgency;
use crate::session::TerminationReason;

/// Remediation route offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Parts and labour by the owner
    Diy,
    /// Owner sources parts, a workshop fits them
    Hybrid,
    /// Full service at a professional workshop
    Workshop,
}

impl PathKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::Diy => "diy",
            PathKind::Hybrid => "hybrid",
            PathKind::Workshop => "workshop",
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Effort required from the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEstimate {
    pub min_hours: f64,
    pub max_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionPath {
    pub kind: PathKind,
    pub cost_estimate: CostRange,
    pub time_estimate: TimeEstimate,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisSummary {
    pub id: String,
    pub display_name: String,
    pub safety_relevant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHypothesis {
    pub id: String,
    pub display_name: String,
    pub weight: f64,
}

/// Outcome of a finished interview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub top_hypothesis: HypothesisSummary,
    /// Ledger weight of the top hypothesis, 0..=100
    pub confidence: f64,
    pub safety_score: u8,
    pub urgency: Urgency,
    pub workshop_recommended: bool,
    /// Full workshop cost range of the top hypothesis
    pub cost_range: CostRange,
    /// Always DIY, Hybrid and Workshop, in recommendation order
    pub solution_paths: Vec<SolutionPath>,
    pub termination_reason: TerminationReason,
    /// Every hypothesis by descending weight
    pub ranking: Vec<RankedHypothesis>,
    pub answered_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_context: Option<Value>,
}
