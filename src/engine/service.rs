//! Diagnosis service
//!
//! Wraps the engine with the session store: load, run one turn, save with
//! the version that was loaded. A lost race surfaces as
//! `ConcurrentModification` and nothing is written.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::errors::{DiagnosisError, DiagnosisResult};
use super::evidence_source::{EvidenceSource, OptionMatcher};
use super::machine::{AnswerOutcome, DiagnosisEngine, Step};
use crate::catalog::{Category, Question};
use crate::ledger::LedgerEntry;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::remediation::FinalResult;
use crate::safety::Urgency;
use crate::session::{DiagnosticSession, SessionState};
use crate::store::{StoreError, SessionStore};

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    /// Reuse an existing id; the interview restarts under it
    #[serde(default)]
    pub session_id: Option<String>,
    pub category: String,
    #[serde(default)]
    pub vehicle_context: Option<Value>,
    #[serde(default)]
    pub location_context: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    pub session_id: String,
    pub question_id: String,
    pub option_value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerTextRequest {
    pub session_id: String,
    pub question_id: String,
    pub text: String,
}

/// Client view of a question: wording and choices, no scoring data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub value: String,
    pub label: String,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            text: question.text.clone(),
            options: question
                .options
                .iter()
                .map(|o| OptionView {
                    value: o.value.clone(),
                    label: o.label.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub budget: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub session_id: String,
    pub question: QuestionView,
    pub safety_score: u8,
    pub progress: Progress,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    /// The question is a clarification inserted by a critical answer
    pub clarifying: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_result: Option<FinalResult>,
    pub safety_score: u8,
    pub urgency: Urgency,
    pub progress: Progress,
    pub version: u64,
}

/// Read-only view of a stored session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: SessionState,
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    pub ledger: Vec<LedgerEntry>,
    pub safety_score: u8,
    pub urgency: Urgency,
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_result: Option<FinalResult>,
    pub version: u64,
}

pub struct DiagnosisService<S: SessionStore> {
    engine: DiagnosisEngine,
    store: S,
    evidence: Arc<dyn EvidenceSource>,
    metrics: Arc<MetricsRegistry>,
}

impl<S: SessionStore> DiagnosisService<S> {
    pub fn new(engine: DiagnosisEngine, store: S) -> Self {
        Self {
            engine,
            store,
            evidence: Arc::new(OptionMatcher::new()),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn with_evidence_source(mut self, evidence: Arc<dyn EvidenceSource>) -> Self {
        self.evidence = evidence;
        self
    }

    /// Share a registry with other components (e.g. the metrics endpoint)
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn engine(&self) -> &DiagnosisEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Start an interview, or restart one when `session_id` names a live session
    pub fn select_category(&self, req: CategoryRequest) -> DiagnosisResult<CategoryResponse> {
        let label = req.session_id.clone().unwrap_or_default();
        let result = self.select_category_inner(req);
        self.observe(&label, result)
    }

    fn select_category_inner(&self, req: CategoryRequest) -> DiagnosisResult<CategoryResponse> {
        let category: Category = req
            .category
            .parse()
            .map_err(|e| DiagnosisError::InvalidState(format!("{}", e)))?;

        let (fresh, expected, reset) = match req.session_id {
            Some(id) => match self.store.load(&id) {
                Ok(existing) => {
                    let fresh = DiagnosticSession::new(id).with_context(
                        req.vehicle_context.or(existing.vehicle_context),
                        req.location_context.or(existing.location_context),
                    );
                    (fresh, existing.version, true)
                }
                Err(StoreError::NotFound(_)) => {
                    let fresh = DiagnosticSession::new(id)
                        .with_context(req.vehicle_context, req.location_context);
                    (fresh, 0, false)
                }
                Err(e) => return Err(e.into()),
            },
            None => {
                let fresh = DiagnosticSession::new(Uuid::new_v4().to_string())
                    .with_context(req.vehicle_context, req.location_context);
                (fresh, 0, false)
            }
        };

        let (session, question) = self.engine.select_category(&fresh, category)?;
        let question = QuestionView::from(question);
        let version = self.store.save(&session, expected)?;

        let version_str = version.to_string();
        let fields = [
            ("session_id", session.session_id.as_str()),
            ("category", category.as_str()),
            ("version", version_str.as_str()),
        ];
        if reset {
            self.metrics.increment_sessions_reset();
            log_event(Event::SessionReset, &fields);
        } else {
            self.metrics.increment_sessions_started();
            log_event(Event::SessionStarted, &fields);
        }

        Ok(CategoryResponse {
            progress: self.progress(&session),
            safety_score: session.safety_score(),
            session_id: session.session_id,
            question,
            version,
        })
    }

    /// Submit a fixed option value
    pub fn submit_answer(&self, req: AnswerRequest) -> DiagnosisResult<AnswerResponse> {
        let result = self
            .store
            .load(&req.session_id)
            .map_err(DiagnosisError::from)
            .and_then(|session| self.apply(session, &req.question_id, &req.option_value));
        self.observe(&req.session_id, result)
    }

    /// Submit free text, resolved to an option value before the engine sees it
    pub fn submit_free_text(&self, req: AnswerTextRequest) -> DiagnosisResult<AnswerResponse> {
        let result = self
            .store
            .load(&req.session_id)
            .map_err(DiagnosisError::from)
            .and_then(|session| {
                if session.is_terminal() {
                    return self.apply(session, &req.question_id, &req.text);
                }
                let question = self.engine.lookup_question(&session, &req.question_id)?;
                let value = self.evidence.resolve(question, &req.text)?;
                self.apply(session, &req.question_id, &value)
            });
        self.observe(&req.session_id, result)
    }

    pub fn snapshot(&self, session_id: &str) -> DiagnosisResult<SessionSnapshot> {
        let session = self.store.load(session_id)?;
        let question = self.engine.current_question(&session)?.map(QuestionView::from);
        Ok(SessionSnapshot {
            state: session.state,
            category: session.category,
            question,
            ledger: session.ledger.entries().to_vec(),
            safety_score: session.safety_score(),
            urgency: session.safety.urgency(),
            progress: self.progress(&session),
            version: session.version,
            final_result: session.final_result,
            session_id: session.session_id,
        })
    }

    /// Drop sessions idle as of `now`
    pub fn evict_idle(&self, now: DateTime<Utc>) -> DiagnosisResult<usize> {
        let evicted = self.store.evict_idle(now)?;
        if evicted > 0 {
            self.metrics.add_evicted(evicted as u64);
            let count = evicted.to_string();
            log_event(Event::SessionsEvicted, &[("count", count.as_str())]);
        }
        Ok(evicted)
    }

    fn apply(
        &self,
        session: DiagnosticSession,
        question_id: &str,
        option_value: &str,
    ) -> DiagnosisResult<AnswerResponse> {
        let loaded_version = session.version;
        match self.engine.submit_answer(&session, question_id, option_value)? {
            AnswerOutcome::AlreadyFinal(result) => {
                self.metrics.increment_final_replays();
                log_event(Event::FinalReplayed, &[("session_id", session.session_id.as_str())]);
                Ok(AnswerResponse {
                    session_id: session.session_id.clone(),
                    question: None,
                    clarifying: false,
                    final_result: Some(result),
                    safety_score: session.safety_score(),
                    urgency: session.safety.urgency(),
                    progress: self.progress(&session),
                    version: loaded_version,
                })
            }
            AnswerOutcome::Advanced { session: next, step } => {
                let version = self.store.save(&next, loaded_version)?;
                self.metrics.increment_answers_applied();
                log_event(
                    Event::AnswerApplied,
                    &[
                        ("session_id", next.session_id.as_str()),
                        ("question_id", question_id),
                        ("option", option_value),
                    ],
                );

                let (question, clarifying, final_result) = match step {
                    Step::Ask {
                        question,
                        clarifying,
                    } => {
                        if clarifying {
                            self.metrics.increment_clarifications();
                            log_event(
                                Event::ClarificationTriggered,
                                &[
                                    ("session_id", next.session_id.as_str()),
                                    ("question_id", question.id.as_str()),
                                ],
                            );
                        }
                        (Some(QuestionView::from(&question)), clarifying, None)
                    }
                    Step::Finished { result } => {
                        self.metrics.record_finalized(result.termination_reason);
                        let confidence = format!("{:.1}", result.confidence);
                        log_event(
                            Event::SessionFinalized,
                            &[
                                ("session_id", next.session_id.as_str()),
                                ("top_hypothesis", result.top_hypothesis.id.as_str()),
                                ("confidence", confidence.as_str()),
                                ("reason", result.termination_reason.as_str()),
                            ],
                        );
                        (None, false, Some(result))
                    }
                };

                Ok(AnswerResponse {
                    progress: self.progress(&next),
                    safety_score: next.safety_score(),
                    urgency: next.safety.urgency(),
                    session_id: next.session_id,
                    question,
                    clarifying,
                    final_result,
                    version,
                })
            }
        }
    }

    fn progress(&self, session: &DiagnosticSession) -> Progress {
        Progress {
            answered: session.answered_count,
            budget: self.engine.budget(session),
        }
    }

    fn observe<T>(&self, session_id: &str, result: DiagnosisResult<T>) -> DiagnosisResult<T> {
        if let Err(err) = &result {
            let message = err.to_string();
            let fields = [
                ("session_id", session_id),
                ("code", err.code()),
                ("message", message.as_str()),
            ];
            match err {
                DiagnosisError::ConcurrentModification { .. } => {
                    self.metrics.increment_store_conflicts();
                    log_event(Event::StoreConflict, &fields);
                }
                DiagnosisError::StoreUnavailable(_) => {
                    self.metrics.increment_store_failures();
                    log_event(Event::StoreFailure, &fields);
                }
                _ => {
                    self.metrics.increment_rejected();
                    log_event(Event::SubmissionRejected, &fields);
                }
            }
        }
        result
    }
}
