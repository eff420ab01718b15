//! Diagnostic session record
//!
//! One mutable record per interview. The engine only ever produces new
//! copies of it; persistence and versioning belong to the session store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::SessionState;
use crate::catalog::Category;
use crate::ledger::Ledger;
use crate::remediation::FinalResult;
use crate::safety::SafetyGauge;

/// Clarifying question inserted by a critical answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClarification {
    /// Option value that fired the rule
    pub trigger_value: String,
    /// Question whose answer was critical
    pub origin_question_id: String,
    /// Clarifying question now being asked
    pub question_id: String,
}

/// One applied answer, in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub option_value: String,
    pub clarifying: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSession {
    pub session_id: String,
    /// Opaque, passed through to the final result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_context: Option<Value>,
    /// Opaque, passed through to the final result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_context: Option<Value>,
    pub category: Option<Category>,
    pub ledger: Ledger,
    pub asked_question_ids: BTreeSet<String>,
    pub pending_critical: Option<PendingClarification>,
    /// Trigger values of critical rules that already fired
    pub fired_rules: BTreeSet<String>,
    /// Question the client is expected to answer next
    pub current_question: Option<String>,
    pub answered_count: usize,
    pub safety: SafetyGauge,
    pub state: SessionState,
    /// Version read from the store; 0 means never persisted
    pub version: u64,
    pub final_result: Option<FinalResult>,
    pub history: Vec<AnswerRecord>,
}

impl DiagnosticSession {
    /// New session waiting for a category
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            vehicle_context: None,
            location_context: None,
            category: None,
            ledger: Ledger::default(),
            asked_question_ids: BTreeSet::new(),
            pending_critical: None,
            fired_rules: BTreeSet::new(),
            current_question: None,
            answered_count: 0,
            safety: SafetyGauge::new(),
            state: SessionState::CategorySelect,
            version: 0,
            final_result: None,
            history: Vec::new(),
        }
    }

    pub fn with_context(mut self, vehicle: Option<Value>, location: Option<Value>) -> Self {
        self.vehicle_context = vehicle;
        self.location_context = location;
        self
    }

    pub fn safety_score(&self) -> u8 {
        self.safety.score()
    }

    pub fn has_asked(&self, question_id: &str) -> bool {
        self.asked_question_ids.contains(question_id)
    }

    pub fn is_terminal(&self) -> bool {
        self.state == SessionState::Terminal
    }

    /// Number of clarifying questions answered so far
    pub fn clarifications_answered(&self) -> usize {
        self.history.iter().filter(|r| r.clarifying).count()
    }
}
