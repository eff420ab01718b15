//! Validated question bank
//!
//! A `Catalog` can only be constructed through `Catalog::new`, which checks
//! every configuration invariant up front. Request-time code can therefore
//! assume that evidence only references declared hypotheses, that base
//! weights sum to 100, and that every critical option has a rule.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use super::builtin;
use super::errors::{CatalogError, CatalogResult};
use super::types::{Category, CategoryBank, Question, YES};

const MIN_HYPOTHESES: usize = 3;
const MAX_HYPOTHESES: usize = 6;
const MIN_SAFETY_PENALTY: u8 = 15;
const MAX_SAFETY_PENALTY: u8 = 35;

/// Immutable, validated collection of category banks
#[derive(Debug, Clone)]
pub struct Catalog {
    banks: BTreeMap<Category, CategoryBank>,
}

impl Catalog {
    /// Validate and index the given banks; every category needs exactly one
    pub fn new(banks: Vec<CategoryBank>) -> CatalogResult<Self> {
        let mut indexed = BTreeMap::new();
        for bank in banks {
            validate_bank(&bank)?;
            let category = bank.category;
            if indexed.insert(category, bank).is_some() {
                return Err(CatalogError::DuplicateCategory(category));
            }
        }
        if let Some(missing) = Category::ALL.into_iter().find(|c| !indexed.contains_key(c)) {
            return Err(CatalogError::MissingCategory(missing));
        }
        Ok(Self { banks: indexed })
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> CatalogResult<Self> {
        Self::new(builtin::banks())
    }

    /// Load a catalog from a JSON array of category banks
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let banks: Vec<CategoryBank> =
            serde_json::from_str(json).map_err(|e| CatalogError::Source(e.to_string()))?;
        Self::new(banks)
    }

    /// Load a catalog from a JSON file
    pub fn from_json_file(path: &Path) -> CatalogResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Source(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Serialize all banks back to JSON
    pub fn to_json(&self) -> CatalogResult<String> {
        let banks: Vec<&CategoryBank> = self.banks.values().collect();
        serde_json::to_string_pretty(&banks).map_err(|e| CatalogError::Source(e.to_string()))
    }

    pub fn bank(&self, category: Category) -> Option<&CategoryBank> {
        self.banks.get(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.banks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

fn validate_bank(bank: &CategoryBank) -> CatalogResult<()> {
    let category = bank.category;

    let count = bank.hypotheses.len();
    if !(MIN_HYPOTHESES..=MAX_HYPOTHESES).contains(&count) {
        return Err(CatalogError::HypothesisCount { category, count });
    }

    let mut hypothesis_ids = HashSet::new();
    let mut sum = 0u32;
    for h in &bank.hypotheses {
        if !hypothesis_ids.insert(h.id.as_str()) {
            return Err(CatalogError::DuplicateHypothesis(h.id.clone()));
        }
        if h.base_weight > 100 {
            return Err(CatalogError::BaseWeightRange {
                hypothesis: h.id.clone(),
                weight: h.base_weight,
            });
        }
        if h.cost_range.min > h.cost_range.max {
            return Err(CatalogError::InvalidCostRange(h.id.clone()));
        }
        sum += h.base_weight;
    }
    if sum != 100 {
        return Err(CatalogError::BaseWeightSum { category, sum });
    }

    if bank.questions.is_empty() {
        return Err(CatalogError::EmptyBank(category));
    }
    if bank.question_budget == 0 {
        return Err(CatalogError::ZeroBudget(category));
    }

    let mut question_ids = HashSet::new();
    for question in &bank.questions {
        if !question_ids.insert(question.id.as_str()) {
            return Err(CatalogError::DuplicateQuestion(question.id.clone()));
        }
        validate_question(question, category, &hypothesis_ids)?;
    }

    let mut triggers = HashSet::new();
    for rule in &bank.critical_rules {
        if !triggers.insert(rule.trigger_value.as_str()) {
            return Err(CatalogError::DuplicateCriticalRule(
                rule.trigger_value.clone(),
            ));
        }
        let clarifying = &rule.clarifying_question;
        if !question_ids.insert(clarifying.id.as_str()) {
            return Err(CatalogError::DuplicateQuestion(clarifying.id.clone()));
        }
        validate_question(clarifying, category, &hypothesis_ids)?;
        if clarifying.options.iter().any(|o| o.critical) {
            return Err(CatalogError::NestedCriticalOption(clarifying.id.clone()));
        }
    }

    for question in &bank.questions {
        for option in question.options.iter().filter(|o| o.critical) {
            if !triggers.contains(option.value.as_str()) {
                return Err(CatalogError::MissingCriticalRule {
                    question: question.id.clone(),
                    value: option.value.clone(),
                });
            }
        }
    }

    Ok(())
}

fn validate_question(
    question: &Question,
    category: Category,
    hypothesis_ids: &HashSet<&str>,
) -> CatalogResult<()> {
    if question.category != category {
        return Err(CatalogError::CategoryMismatch {
            question: question.id.clone(),
            tagged: question.category,
            bank: category,
        });
    }
    if question.options.len() < 2 {
        return Err(CatalogError::TooFewOptions(question.id.clone()));
    }

    let mut values = HashSet::new();
    for option in &question.options {
        if !values.insert(option.value.as_str()) {
            return Err(CatalogError::DuplicateOption {
                question: question.id.clone(),
                value: option.value.clone(),
            });
        }
        for hypothesis in option.evidence.keys() {
            if !hypothesis_ids.contains(hypothesis.as_str()) {
                return Err(CatalogError::UnknownHypothesis {
                    question: question.id.clone(),
                    hypothesis: hypothesis.clone(),
                });
            }
        }
    }

    if let Some(penalty) = question.safety_penalty {
        if !(MIN_SAFETY_PENALTY..=MAX_SAFETY_PENALTY).contains(&penalty) {
            return Err(CatalogError::SafetyPenaltyRange {
                question: question.id.clone(),
                penalty,
            });
        }
        if question.option(YES).is_none() {
            return Err(CatalogError::SafetyQuestionWithoutYes(question.id.clone()));
        }
    }

    Ok(())
}
