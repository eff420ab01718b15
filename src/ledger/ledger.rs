//! Hypothesis ledger and evidence updater
//!
//! The ledger is an ordered distribution over the hypotheses of one
//! category. Order is declaration order and doubles as the tie-break order.
//!
//! Invariants after every update:
//! - every weight is >= 0
//! - weights sum to 100 (within `SUM_TOLERANCE`)

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::catalog::{AnswerOption, CategoryBank};

/// Total every normalized ledger sums to
pub const LEDGER_TOTAL: f64 = 100.0;

/// Floating point slack allowed when checking the sum
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Weight of one hypothesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub hypothesis_id: String,
    pub weight: f64,
}

/// Per-session distribution over candidate causes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Initial ledger from the category's base weights
    ///
    /// Base weights are validated to sum to 100 when the catalog is built.
    pub fn from_base(bank: &CategoryBank) -> Self {
        Self {
            entries: bank
                .hypotheses
                .iter()
                .map(|h| LedgerEntry {
                    hypothesis_id: h.id.clone(),
                    weight: h.base_weight as f64,
                })
                .collect(),
        }
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weight(&self, hypothesis_id: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.hypothesis_id == hypothesis_id)
            .map(|e| e.weight)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Whether the sum and sign invariants hold
    pub fn is_normalized(&self) -> bool {
        !self.entries.is_empty()
            && self.entries.iter().all(|e| e.weight >= 0.0)
            && (self.total() - LEDGER_TOTAL).abs() <= SUM_TOLERANCE
    }

    /// Highest weight; the first declared wins a tie
    pub fn top(&self) -> Option<&LedgerEntry> {
        let mut best: Option<&LedgerEntry> = None;
        for entry in &self.entries {
            match best {
                Some(b) if entry.weight <= b.weight => {}
                _ => best = Some(entry),
            }
        }
        best
    }

    /// Entries by descending weight, ties in declaration order
    pub fn ranked(&self) -> Vec<&LedgerEntry> {
        let mut ranked: Vec<&LedgerEntry> = self.entries.iter().collect();
        // stable sort keeps declaration order among equal weights
        ranked.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
        ranked
    }
}

/// Apply the chosen option's evidence and renormalize to 100.
///
/// Deltas are added to the referenced hypotheses, every weight is clamped
/// at zero, then the distribution is rescaled so it sums to 100. If every
/// weight ends up at zero the `base` distribution is returned instead.
/// Evidence for ids outside the ledger is ignored; the catalog rejects such
/// references at load time.
pub fn apply_evidence(ledger: &Ledger, option: &AnswerOption, base: &Ledger) -> Ledger {
    let mut entries: Vec<LedgerEntry> = ledger
        .entries
        .iter()
        .map(|e| {
            let delta = option.evidence.get(&e.hypothesis_id).copied().unwrap_or(0);
            LedgerEntry {
                hypothesis_id: e.hypothesis_id.clone(),
                weight: (e.weight + delta as f64).max(0.0),
            }
        })
        .collect();

    let sum: f64 = entries.iter().map(|e| e.weight).sum();
    if sum <= 0.0 {
        return base.clone();
    }

    for entry in &mut entries {
        entry.weight = entry.weight / sum * LEDGER_TOTAL;
    }

    Ledger { entries }
}
