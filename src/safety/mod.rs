//! Safety subsystem
//!
//! An independent 40..=100 score answering "is it still safe to drive?".
//! It answers a different question than the ledger and the two are never
//! combined into one number.

mod gauge;

pub use gauge::{update_safety, SafetyGauge, Urgency, SAFETY_CEILING, SAFETY_FLOOR};
