//! Termination policy
//!
//! Decides, after a questioning-state update, whether the interview goes on.
//! It is never consulted while a clarification is pending.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::selector::next_question;
use super::session::DiagnosticSession;
use crate::catalog::{CategoryBank, Question};

/// Top-hypothesis weight at which the interview stops
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 70.0;

/// Why an interview ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Top hypothesis reached the confidence threshold
    ConfidenceReached,
    /// Category question budget used up
    BudgetExhausted,
    /// No unasked questions left in the bank
    BankExhausted,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfidenceReached => "confidence_reached",
            Self::BudgetExhausted => "budget_exhausted",
            Self::BankExhausted => "bank_exhausted",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<'a> {
    /// Ask this question next
    Continue(&'a Question),
    /// Finalize the session
    Stop(TerminationReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminationPolicy {
    confidence_threshold: f64,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl TerminationPolicy {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
        }
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Stop when any of these holds, checked in this order:
    /// 1. top weight >= threshold
    /// 2. answered count >= category budget
    /// 3. no unasked bank question remains
    pub fn evaluate<'a>(&self, session: &DiagnosticSession, bank: &'a CategoryBank) -> Verdict<'a> {
        let top = session.ledger.top().map(|e| e.weight).unwrap_or(0.0);
        if top >= self.confidence_threshold {
            return Verdict::Stop(TerminationReason::ConfidenceReached);
        }
        if session.answered_count >= bank.question_budget {
            return Verdict::Stop(TerminationReason::BudgetExhausted);
        }
        match next_question(session, bank) {
            Some(question) => Verdict::Continue(question),
            None => Verdict::Stop(TerminationReason::BankExhausted),
        }
    }

    pub fn should_terminate(&self, session: &DiagnosticSession, bank: &CategoryBank) -> bool {
        matches!(self.evaluate(session, bank), Verdict::Stop(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};
    use crate::ledger::Ledger;

    fn session_for(bank: &CategoryBank) -> DiagnosticSession {
        let mut session = DiagnosticSession::new("s");
        session.category = Some(bank.category);
        session.ledger = Ledger::from_base(bank);
        session
    }

    #[test]
    fn test_continue_on_fresh_session() {
        let catalog = Catalog::builtin().unwrap();
        let bank = catalog.bank(Category::Engine).unwrap();
        let session = session_for(bank);
        let policy = TerminationPolicy::default();

        match policy.evaluate(&session, bank) {
            Verdict::Continue(q) => assert_eq!(q.id, "engine_rough_idle"),
            other => panic!("expected Continue, got {:?}", other),
        }
        assert!(!policy.should_terminate(&session, bank));
    }

    #[test]
    fn test_stops_on_confidence() {
        let catalog = Catalog::builtin().unwrap();
        let bank = catalog.bank(Category::Engine).unwrap();
        let session = session_for(bank);
        // base top weight is 25
        let policy = TerminationPolicy::new(25.0);
        assert_eq!(
            policy.evaluate(&session, bank),
            Verdict::Stop(TerminationReason::ConfidenceReached)
        );
    }

    #[test]
    fn test_stops_on_budget() {
        let catalog = Catalog::builtin().unwrap();
        let bank = catalog.bank(Category::Engine).unwrap();
        let mut session = session_for(bank);
        session.answered_count = bank.question_budget;
        assert_eq!(
            TerminationPolicy::default().evaluate(&session, bank),
            Verdict::Stop(TerminationReason::BudgetExhausted)
        );
    }

    #[test]
    fn test_stops_on_exhausted_bank() {
        let catalog = Catalog::builtin().unwrap();
        let mut bank = catalog.bank(Category::Engine).unwrap().clone();
        bank.question_budget = 50;
        let mut session = session_for(&bank);
        for q in &bank.questions {
            session.asked_question_ids.insert(q.id.clone());
        }
        assert_eq!(
            TerminationPolicy::default().evaluate(&session, &bank),
            Verdict::Stop(TerminationReason::BankExhausted)
        );
    }
}
