//! Free-text answer resolution
//!
//! The engine only ever sees fixed option values. Anything typed by a user
//! goes through an `EvidenceSource` first.

use regex::Regex;

use super::errors::{DiagnosisError, DiagnosisResult};
use crate::catalog::{AnswerOption, Question};

/// Resolves free text to one of a question's option values
pub trait EvidenceSource: Send + Sync {
    fn resolve(&self, question: &Question, text: &str) -> DiagnosisResult<String>;
}

/// Deterministic matcher over option index, value and label.
///
/// Tried in order, first hit wins:
/// 1. 1-based option number (`"2"`)
/// 2. exact value or label, case-insensitive
/// 3. value or label appearing as whole words in the text, only if exactly
///    one option matches
#[derive(Debug, Clone, Default)]
pub struct OptionMatcher;

impl OptionMatcher {
    pub fn new() -> Self {
        Self
    }

    fn word_pattern(phrase: &str) -> DiagnosisResult<Regex> {
        // underscores in values read as spaces or hyphens in prose
        let escaped = regex::escape(&phrase.trim().to_lowercase()).replace('_', r"[\s_-]");
        let escaped = escaped.replace(' ', r"\s+");
        Regex::new(&format!(r"(?i)\b{}\b", escaped))
            .map_err(|e| DiagnosisError::Configuration(format!("option pattern: {}", e)))
    }

    fn mentions(option: &AnswerOption, text: &str) -> DiagnosisResult<bool> {
        for phrase in [&option.value, &option.label] {
            if phrase.trim().is_empty() {
                continue;
            }
            if Self::word_pattern(phrase)?.is_match(text) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl EvidenceSource for OptionMatcher {
    fn resolve(&self, question: &Question, text: &str) -> DiagnosisResult<String> {
        let unresolved = || DiagnosisError::UnknownOption {
            question: question.id.clone(),
            option: text.to_string(),
        };
        let input = text.trim();
        if input.is_empty() {
            return Err(unresolved());
        }

        if let Ok(n) = input.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| question.options.get(i))
                .map(|o| o.value.clone())
                .ok_or_else(unresolved);
        }

        if let Some(option) = question.options.iter().find(|o| {
            o.value.eq_ignore_ascii_case(input) || o.label.eq_ignore_ascii_case(input)
        }) {
            return Ok(option.value.clone());
        }

        let mut hits = Vec::new();
        for option in &question.options {
            if Self::mentions(option, input)? {
                hits.push(option);
            }
        }
        match hits.as_slice() {
            [only] => Ok(only.value.clone()),
            _ => Err(unresolved()),
        }
    }
}
