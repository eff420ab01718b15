//! Observable diagnosis events

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    StartupBegin,
    StartupComplete,
    ConfigLoaded,
    CatalogLoaded,
    Serving,

    // Sessions
    SessionStarted,
    /// Category re-selected on an existing session
    SessionReset,
    AnswerApplied,
    ClarificationTriggered,
    SessionFinalized,
    /// Submission on a terminal session, cached result returned
    FinalReplayed,
    SessionsEvicted,

    // Failures
    SubmissionRejected,
    StoreConflict,
    StoreFailure,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StartupBegin => "AUTODIAG_STARTUP_BEGIN",
            Event::StartupComplete => "AUTODIAG_STARTUP_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::Serving => "AUTODIAG_SERVING",
            Event::SessionStarted => "SESSION_STARTED",
            Event::SessionReset => "SESSION_RESET",
            Event::AnswerApplied => "ANSWER_APPLIED",
            Event::ClarificationTriggered => "CLARIFICATION_TRIGGERED",
            Event::SessionFinalized => "SESSION_FINALIZED",
            Event::FinalReplayed => "FINAL_REPLAYED",
            Event::SessionsEvicted => "SESSIONS_EVICTED",
            Event::SubmissionRejected => "SUBMISSION_REJECTED",
            Event::StoreConflict => "STORE_CONFLICT",
            Event::StoreFailure => "STORE_FAILURE",
        }
    }

    /// Default severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SubmissionRejected | Event::StoreConflict => Severity::Warn,
            Event::StoreFailure => Severity::Error,
            Event::AnswerApplied => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_upper_snake() {
        let events = [
            Event::StartupBegin,
            Event::CatalogLoaded,
            Event::SessionStarted,
            Event::SessionReset,
            Event::ClarificationTriggered,
            Event::SessionFinalized,
            Event::FinalReplayed,
            Event::StoreConflict,
        ];
        for event in events {
            assert!(event.as_str().chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_severities() {
        assert_eq!(Event::StoreConflict.severity(), Severity::Warn);
        assert_eq!(Event::StoreFailure.severity(), Severity::Error);
        assert_eq!(Event::SessionFinalized.severity(), Severity::Info);
    }
}
