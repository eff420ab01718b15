//! Safety gauge
//!
//! Tracks whether continued use of the vehicle is already unsafe. It is fed
//! by a fixed set of safety-critical yes/no questions and is never mixed into
//! the hypothesis ledger.
//!
//! The gauge remembers the penalty recorded per question, so answering the
//! same question again replaces the earlier answer instead of stacking.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{AnswerOption, Question, YES};

/// Score with no recorded penalties
pub const SAFETY_CEILING: u8 = 100;

/// Lowest score the gauge reports
pub const SAFETY_FLOOR: u8 = 40;

/// Per-session record of safety penalties
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafetyGauge {
    /// question id -> penalty recorded for a "yes"
    penalties: BTreeMap<String, u8>,
}

impl SafetyGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current score, clamped to [SAFETY_FLOOR, SAFETY_CEILING]
    pub fn score(&self) -> u8 {
        let total: u32 = self.penalties.values().map(|p| *p as u32).sum();
        let raw = (SAFETY_CEILING as u32).saturating_sub(total);
        raw.max(SAFETY_FLOOR as u32) as u8
    }

    pub fn urgency(&self) -> Urgency {
        Urgency::from_score(self.score())
    }

    pub fn penalties(&self) -> &BTreeMap<String, u8> {
        &self.penalties
    }
}

/// Record the answer to `question` and return the new gauge.
///
/// Questions without a safety penalty leave the gauge unchanged. A "yes"
/// records the question's penalty; any other answer clears it.
pub fn update_safety(
    gauge: &SafetyGauge,
    question: &Question,
    option: &AnswerOption,
) -> SafetyGauge {
    let Some(penalty) = question.safety_penalty else {
        return gauge.clone();
    };

    let mut next = gauge.clone();
    if option.value == YES {
        next.penalties.insert(question.id.clone(), penalty);
    } else {
        next.penalties.remove(&question.id);
    }
    next
}

/// Urgency indicator shown next to the diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Safe to keep driving carefully
    Low,
    /// Get it checked soon
    Elevated,
    /// Do not keep driving
    StopDriving,
}

impl Urgency {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Urgency::Low,
            60..=79 => Urgency::Elevated,
            _ => Urgency::StopDriving,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Elevated => "elevated",
            Urgency::StopDriving => "stop_driving",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
