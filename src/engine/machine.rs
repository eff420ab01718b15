//! Diagnosis engine
//!
//! Pure orchestration of one interview turn. Every operation validates its
//! input against the catalog before touching anything, then returns a new
//! session value; the caller decides whether to persist it.

use std::sync::Arc;

use serde::Serialize;

use super::errors::{DiagnosisError, DiagnosisResult};
use crate::catalog::{Catalog, Category, CategoryBank, Question};
use crate::ledger::{apply_evidence, Ledger};
use crate::remediation::{derive, FinalResult};
use crate::safety::update_safety;
use crate::session::{
    next_question, AnswerRecord, DiagnosticSession, PendingClarification, SessionState,
    TerminationPolicy, Verdict,
};

/// What the client should do after a turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Step {
    /// Present this question next
    Ask { question: Question, clarifying: bool },
    /// Interview is over
    Finished { result: FinalResult },
}

/// Result of an answer submission
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// The session moved; the new value must be persisted
    Advanced {
        session: DiagnosticSession,
        step: Step,
    },
    /// Session was already terminal; nothing changed
    AlreadyFinal(FinalResult),
}

#[derive(Debug, Clone)]
pub struct DiagnosisEngine {
    catalog: Arc<Catalog>,
    policy: TerminationPolicy,
}

impl DiagnosisEngine {
    pub fn new(catalog: Arc<Catalog>, policy: TerminationPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> TerminationPolicy {
        self.policy
    }

    pub fn bank(&self, category: Category) -> DiagnosisResult<&CategoryBank> {
        self.catalog.bank(category).ok_or_else(|| {
            DiagnosisError::Configuration(format!("no question bank for category '{}'", category))
        })
    }

    fn session_bank(&self, session: &DiagnosticSession) -> DiagnosisResult<&CategoryBank> {
        let category = session.category.ok_or_else(|| {
            DiagnosisError::InvalidState("no category selected".to_string())
        })?;
        self.bank(category)
    }

    /// CATEGORY_SELECT -> QUESTIONING.
    ///
    /// Seeds the ledger from the bank's base weights and asks the first bank
    /// question. Termination is not evaluated on entry.
    pub fn select_category(
        &self,
        session: &DiagnosticSession,
        category: Category,
    ) -> DiagnosisResult<(DiagnosticSession, &Question)> {
        let bank = self.bank(category)?;
        let state = session.state.begin_questioning()?;

        let mut next = session.clone();
        next.category = Some(category);
        next.ledger = Ledger::from_base(bank);
        next.state = state;

        let question = next_question(&next, bank).ok_or_else(|| {
            DiagnosisError::Configuration(format!("category '{}' has no questions", category))
        })?;
        next.current_question = Some(question.id.clone());
        Ok((next, question))
    }

    /// Resolve a question id within the session's category, clarifying
    /// questions included
    pub fn lookup_question(
        &self,
        session: &DiagnosticSession,
        question_id: &str,
    ) -> DiagnosisResult<&Question> {
        self.session_bank(session)?
            .question(question_id)
            .ok_or_else(|| DiagnosisError::UnknownQuestion(question_id.to_string()))
    }

    /// Question budget of the session's category, 0 before selection
    pub fn budget(&self, session: &DiagnosticSession) -> usize {
        session
            .category
            .and_then(|c| self.catalog.bank(c))
            .map(|b| b.question_budget)
            .unwrap_or(0)
    }

    /// Question the session is waiting on, if any
    pub fn current_question(
        &self,
        session: &DiagnosticSession,
    ) -> DiagnosisResult<Option<&Question>> {
        let Some(id) = session.current_question.as_deref() else {
            return Ok(None);
        };
        self.lookup_question(session, id).map(Some)
    }

    /// Apply one answer.
    ///
    /// Validation order: terminal replay, state, question id, currency of the
    /// question, option value. Nothing is mutated unless all checks pass.
    pub fn submit_answer(
        &self,
        session: &DiagnosticSession,
        question_id: &str,
        option_value: &str,
    ) -> DiagnosisResult<AnswerOutcome> {
        if session.state == SessionState::Terminal {
            return session
                .final_result
                .clone()
                .map(AnswerOutcome::AlreadyFinal)
                .ok_or_else(|| {
                    DiagnosisError::InvalidState("terminal session has no result".to_string())
                });
        }
        if !session.state.accepts_answers() {
            return Err(DiagnosisError::InvalidState(format!(
                "session is in {}; select a category first",
                session.state
            )));
        }

        let bank = self.session_bank(session)?;
        let question = bank
            .question(question_id)
            .ok_or_else(|| DiagnosisError::UnknownQuestion(question_id.to_string()))?;
        if session.current_question.as_deref() != Some(question_id) {
            return Err(DiagnosisError::InvalidState(format!(
                "question '{}' is not the current question",
                question_id
            )));
        }
        let option = question
            .option(option_value)
            .ok_or_else(|| DiagnosisError::UnknownOption {
                question: question_id.to_string(),
                option: option_value.to_string(),
            })?;

        let clarifying = session.state == SessionState::Clarifying;
        let base = Ledger::from_base(bank);

        let mut next = session.clone();
        next.ledger = apply_evidence(&session.ledger, option, &base);
        next.safety = update_safety(&session.safety, question, option);
        next.asked_question_ids.insert(question.id.clone());
        next.answered_count += 1;
        next.history.push(AnswerRecord {
            question_id: question.id.clone(),
            option_value: option.value.clone(),
            clarifying,
        });

        if clarifying {
            next.pending_critical = None;
            next.state = next.state.resume_questioning()?;
            return self.land(next, bank);
        }

        // a rule fires at most once; a repeat trigger counts as an ordinary answer
        let rule = if option.critical && !session.fired_rules.contains(&option.value) {
            bank.critical_rule(&option.value)
        } else {
            None
        };

        match rule {
            Some(rule) => {
                let clarifying_question = &rule.clarifying_question;
                next.fired_rules.insert(rule.trigger_value.clone());
                next.pending_critical = Some(PendingClarification {
                    trigger_value: rule.trigger_value.clone(),
                    origin_question_id: question.id.clone(),
                    question_id: clarifying_question.id.clone(),
                });
                next.current_question = Some(clarifying_question.id.clone());
                next.state = next.state.begin_clarifying()?;
                Ok(AnswerOutcome::Advanced {
                    session: next,
                    step: Step::Ask {
                        question: clarifying_question.clone(),
                        clarifying: true,
                    },
                })
            }
            None => self.land(next, bank),
        }
    }

    /// Session has just entered QUESTIONING: continue or finalize
    fn land(
        &self,
        mut next: DiagnosticSession,
        bank: &CategoryBank,
    ) -> DiagnosisResult<AnswerOutcome> {
        match self.policy.evaluate(&next, bank) {
            Verdict::Continue(question) => {
                next.current_question = Some(question.id.clone());
                Ok(AnswerOutcome::Advanced {
                    session: next,
                    step: Step::Ask {
                        question: question.clone(),
                        clarifying: false,
                    },
                })
            }
            Verdict::Stop(reason) => {
                let result = derive(&next, bank, reason)?;
                next.state = next.state.finalize()?;
                next.current_question = None;
                next.final_result = Some(result.clone());
                Ok(AnswerOutcome::Advanced {
                    session: next,
                    step: Step::Finished { result },
                })
            }
        }
    }
}
