//! Hypothesis ledger
//!
//! Evidence-weighted ranking of candidate causes. The updater is a pure
//! function: it never touches the session, the store or the safety gauge.

mod ledger;

pub use ledger::{apply_evidence, Ledger, LedgerEntry, LEDGER_TOTAL, SUM_TOLERANCE};
