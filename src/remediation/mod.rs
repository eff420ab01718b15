//! Remediation subsystem
//!
//! Turns the finished ledger into a cost estimate and three ranked solution
//! paths (DIY, Hybrid, Workshop).

mod deriver;
mod profile;
mod result;

pub use deriver::{derive, WORKSHOP_CONFIDENCE};
pub use profile::{profile_for, CategoryProfile, PathProfile};
pub use result::{
    Difficulty, FinalResult, HypothesisSummary, PathKind, RankedHypothesis, SolutionPath,
    TimeEstimate,
};
