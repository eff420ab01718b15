//! autodiag - deterministic vehicle fault self-diagnosis
//!
//! A customer picks a fault category and answers a bounded series of
//! multiple-choice questions. Each answer shifts evidence weights over the
//! category's hypotheses; the interview ends on confidence, budget, or
//! exhaustion and produces a ranked diagnosis with safety urgency and
//! repair paths.

pub mod catalog;
pub mod cli;
pub mod engine;
pub mod http_server;
pub mod ledger;
pub mod observability;
pub mod remediation;
pub mod safety;
pub mod session;
pub mod store;
