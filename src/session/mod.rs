//! Session subsystem
//!
//! The session record, its state machine, the question selector and the
//! termination policy. Everything here is deterministic and free of I/O.

mod selector;
mod session;
mod state;
mod termination;

pub use selector::next_question;
pub use session::{AnswerRecord, DiagnosticSession, PendingClarification};
pub use state::SessionState;
pub use termination::{TerminationPolicy, TerminationReason, Verdict, DEFAULT_CONFIDENCE_THRESHOLD};
