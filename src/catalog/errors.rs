//! # Catalog Errors
//!
//! Every catalog error is a configuration error: it is detected while the
//! question bank is loaded and is fatal at startup. None of these can occur
//! while a request is being served.

use thiserror::Error;

use super::types::Category;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Question bank configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    // ==================
    // Hypothesis Errors
    // ==================

    /// Base weights of a category must sum to exactly 100
    #[error("Base weights for category '{category}' sum to {sum}, expected 100")]
    BaseWeightSum { category: Category, sum: u32 },

    /// A single base weight is outside [0, 100]
    #[error("Hypothesis '{hypothesis}' has base weight {weight} outside [0, 100]")]
    BaseWeightRange { hypothesis: String, weight: u32 },

    /// A category must declare between 3 and 6 hypotheses
    #[error("Category '{category}' declares {count} hypotheses, expected 3 to 6")]
    HypothesisCount { category: Category, count: usize },

    /// Hypothesis ids must be unique within a category
    #[error("Duplicate hypothesis id '{0}'")]
    DuplicateHypothesis(String),

    /// Cost range has min above max
    #[error("Hypothesis '{0}' has an inverted cost range")]
    InvalidCostRange(String),

    // ==================
    // Question Errors
    // ==================

    /// Evidence references a hypothesis not declared in the category
    #[error("Question '{question}' references unknown hypothesis '{hypothesis}'")]
    UnknownHypothesis { question: String, hypothesis: String },

    /// Question ids must be unique within a category, clarifying ones included
    #[error("Duplicate question id '{0}'")]
    DuplicateQuestion(String),

    /// Option values must be unique within a question
    #[error("Question '{question}' has duplicate option value '{value}'")]
    DuplicateOption { question: String, value: String },

    /// A question needs at least two options
    #[error("Question '{0}' has fewer than two options")]
    TooFewOptions(String),

    /// A question is filed under a different category than its bank
    #[error("Question '{question}' is tagged '{tagged}' but filed under '{bank}'")]
    CategoryMismatch { question: String, tagged: Category, bank: Category },

    /// Safety penalty outside the calibrated 15..=35 band
    #[error("Question '{question}' has safety penalty {penalty}, expected 15 to 35")]
    SafetyPenaltyRange { question: String, penalty: u8 },

    /// A safety-critical question must offer a "yes" option
    #[error("Safety-critical question '{0}' has no \"yes\" option")]
    SafetyQuestionWithoutYes(String),

    // ==================
    // Critical Rule Errors
    // ==================

    /// A critical option has no rule for its value
    #[error("Critical option '{value}' on question '{question}' has no clarifying rule")]
    MissingCriticalRule { question: String, value: String },

    /// Two rules share the same trigger value
    #[error("Duplicate critical rule trigger '{0}'")]
    DuplicateCriticalRule(String),

    /// Clarifying questions may not branch again
    #[error("Clarifying question '{0}' contains a critical option")]
    NestedCriticalOption(String),

    // ==================
    // Bank Errors
    // ==================

    /// A category has no questions
    #[error("Category '{0}' has an empty question bank")]
    EmptyBank(Category),

    /// A question budget of zero would terminate before asking anything
    #[error("Category '{0}' has a question budget of zero")]
    ZeroBudget(Category),

    /// Every category must have a bank so none can fail at request time
    #[error("Category '{0}' has no question bank")]
    MissingCategory(Category),

    /// The same category is declared twice
    #[error("Category '{0}' is declared more than once")]
    DuplicateCategory(Category),

    /// Catalog file could not be read or parsed
    #[error("Catalog source error: {0}")]
    Source(String),
}

impl CatalogError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::Source(_) => "DIAG_CATALOG_SOURCE",
            _ => "DIAG_CONFIGURATION",
        }
    }
}
