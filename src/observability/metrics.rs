//! Diagnosis counters
//!
//! Monotonic, reset only on process start. Relaxed atomics; readers may see
//! counters from slightly different instants.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::session::TerminationReason;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    sessions_started: AtomicU64,
    sessions_reset: AtomicU64,
    answers_applied: AtomicU64,
    clarifications_triggered: AtomicU64,
    finalized_confidence: AtomicU64,
    finalized_budget: AtomicU64,
    finalized_bank: AtomicU64,
    final_replays: AtomicU64,
    submissions_rejected: AtomicU64,
    store_conflicts: AtomicU64,
    store_failures: AtomicU64,
    sessions_evicted: AtomicU64,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub sessions_started: u64,
    pub sessions_reset: u64,
    pub answers_applied: u64,
    pub clarifications_triggered: u64,
    pub sessions_finalized: u64,
    pub finalized_confidence_reached: u64,
    pub finalized_budget_exhausted: u64,
    pub finalized_bank_exhausted: u64,
    pub final_replays: u64,
    pub submissions_rejected: u64,
    pub store_conflicts: u64,
    pub store_failures: u64,
    pub sessions_evicted: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

fn read(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_sessions_started(&self) {
        bump(&self.sessions_started);
    }

    pub fn increment_sessions_reset(&self) {
        bump(&self.sessions_reset);
    }

    pub fn increment_answers_applied(&self) {
        bump(&self.answers_applied);
    }

    pub fn increment_clarifications(&self) {
        bump(&self.clarifications_triggered);
    }

    pub fn record_finalized(&self, reason: TerminationReason) {
        match reason {
            TerminationReason::ConfidenceReached => bump(&self.finalized_confidence),
            TerminationReason::BudgetExhausted => bump(&self.finalized_budget),
            TerminationReason::BankExhausted => bump(&self.finalized_bank),
        }
    }

    pub fn increment_final_replays(&self) {
        bump(&self.final_replays);
    }

    pub fn increment_rejected(&self) {
        bump(&self.submissions_rejected);
    }

    pub fn increment_store_conflicts(&self) {
        bump(&self.store_conflicts);
    }

    pub fn increment_store_failures(&self) {
        bump(&self.store_failures);
    }

    pub fn add_evicted(&self, count: u64) {
        self.sessions_evicted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let confidence = read(&self.finalized_confidence);
        let budget = read(&self.finalized_budget);
        let bank = read(&self.finalized_bank);
        MetricsSnapshot {
            sessions_started: read(&self.sessions_started),
            sessions_reset: read(&self.sessions_reset),
            answers_applied: read(&self.answers_applied),
            clarifications_triggered: read(&self.clarifications_triggered),
            sessions_finalized: confidence + budget + bank,
            finalized_confidence_reached: confidence,
            finalized_budget_exhausted: budget,
            finalized_bank_exhausted: bank,
            final_replays: read(&self.final_replays),
            submissions_rejected: read(&self.submissions_rejected),
            store_conflicts: read(&self.store_conflicts),
            store_failures: read(&self.store_failures),
            sessions_evicted: read(&self.sessions_evicted),
        }
    }

    /// Snapshot as a JSON object with fixed key order
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}
