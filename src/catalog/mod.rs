//! Question bank subsystem
//!
//! Static reference data for the interview:
//! - Categories and their candidate hypotheses
//! - Ordered multiple-choice questions with per-option evidence
//! - Critical-answer rules that insert one clarifying question
//!
//! All invariants are checked once, when the catalog is built. A catalog
//! that fails validation is a fatal startup error.

mod builtin;
mod catalog;
mod errors;
mod types;

pub use catalog::Catalog;
pub use errors::{CatalogError, CatalogResult};
pub use types::{
    AnswerOption, Category, CategoryBank, CostRange, CriticalRule, Hypothesis, ParseCategoryError,
    Question, YES,
};
