//! Reference data types for the question bank
//!
//! All of these are immutable once a `Catalog` has been validated.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Option value that counts as an affirmative answer for safety checks
pub const YES: &str = "yes";

/// Symptom category chosen at the start of an interview
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Engine,
    Brakes,
    Electrical,
    Suspension,
    Climate,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 5] = [
        Category::Engine,
        Category::Brakes,
        Category::Electrical,
        Category::Suspension,
        Category::Climate,
    ];

    /// Returns the wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Engine => "engine",
            Category::Brakes => "brakes",
            Category::Electrical => "electrical",
            Category::Suspension => "suspension",
            Category::Climate => "climate",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unrecognized category name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category '{0}'")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Repair cost band in whole currency units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: u32,
    pub max: u32,
    pub currency: String,
}

impl CostRange {
    pub fn new(min: u32, max: u32, currency: impl Into<String>) -> Self {
        Self {
            min,
            max,
            currency: currency.into(),
        }
    }

    /// Scale both bounds by `factor`, rounding to whole units
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min: (self.min as f64 * factor).round() as u32,
            max: (self.max as f64 * factor).round() as u32,
            currency: self.currency.clone(),
        }
    }
}

/// Candidate root cause of a symptom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: String,
    pub display_name: String,
    pub category: Category,
    pub base_weight: u32,
    pub safety_relevant: bool,
    pub cost_range: CostRange,
}

/// One fixed answer to a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: String,
    pub label: String,
    /// hypothesis id -> signed weight delta
    #[serde(default)]
    pub evidence: BTreeMap<String, i32>,
    #[serde(default)]
    pub critical: bool,
}

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: Category,
    pub text: String,
    pub options: Vec<AnswerOption>,
    /// Present on safety-critical yes/no checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_penalty: Option<u8>,
}

impl Question {
    /// Look up an option by its value
    pub fn option(&self, value: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Whether a "yes" to this question lowers the safety score
    pub fn is_safety_critical(&self) -> bool {
        self.safety_penalty.is_some()
    }
}

/// A one-shot follow-up asked when a critical option is chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalRule {
    pub trigger_value: String,
    pub clarifying_question: Question,
}

fn default_budget() -> usize {
    5
}

/// Everything the engine knows about one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBank {
    pub category: Category,
    /// Declaration order is the tie-break order
    pub hypotheses: Vec<Hypothesis>,
    /// Asked in this order
    pub questions: Vec<Question>,
    #[serde(default)]
    pub critical_rules: Vec<CriticalRule>,
    #[serde(default = "default_budget")]
    pub question_budget: usize,
}

impl CategoryBank {
    pub fn hypothesis(&self, id: &str) -> Option<&Hypothesis> {
        self.hypotheses.iter().find(|h| h.id == id)
    }

    /// Rule triggered by an option value, if any
    pub fn critical_rule(&self, trigger_value: &str) -> Option<&CriticalRule> {
        self.critical_rules
            .iter()
            .find(|r| r.trigger_value == trigger_value)
    }

    /// Find a question by id, searching bank questions then clarifying ones
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id).or_else(|| {
            self.critical_rules
                .iter()
                .map(|r| &r.clarifying_question)
                .find(|q| q.id == id)
        })
    }

    /// Whether `id` names a clarifying question rather than a bank question
    pub fn is_clarifying(&self, id: &str) -> bool {
        self.critical_rules
            .iter()
            .any(|r| r.clarifying_question.id == id)
    }
}
