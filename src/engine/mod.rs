//! Diagnosis engine
//!
//! `DiagnosisEngine` runs one interview turn over an in-memory session and
//! never performs I/O. `DiagnosisService` adds the session store, free-text
//! resolution, logging and counters around it.
//!
//! Per answer the engine:
//! 1. validates state, question and option
//! 2. updates the ledger and the safety gauge
//! 3. routes critical answers to a clarifying question
//! 4. otherwise asks the termination policy whether to continue
//! 5. derives and caches the final result on stop

mod errors;
pub mod evidence_source;
mod machine;
mod service;

pub use errors::{DiagnosisError, DiagnosisResult, RESTART_MESSAGE, RETRY_MESSAGE};
pub use evidence_source::{EvidenceSource, OptionMatcher};
pub use machine::{AnswerOutcome, DiagnosisEngine, Step};
pub use service::{
    AnswerRequest, AnswerResponse, AnswerTextRequest, CategoryRequest, CategoryResponse,
    DiagnosisService, OptionView, Progress, QuestionView, SessionSnapshot,
};
