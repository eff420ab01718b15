//! Interview state machine
//!
//! States are explicit and transitions are methods that consume the current
//! state. A forbidden transition is an `InvalidState` error, never a silent
//! no-op.
//!
//! ```text
//! CATEGORY_SELECT -> QUESTIONING <-> CLARIFYING
//!                        |               |
//!                        +--> TERMINAL <-+
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::{DiagnosisError, DiagnosisResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Created, waiting for a symptom category
    CategorySelect,
    /// Working through the category's question bank
    Questioning,
    /// One clarifying question is pending
    Clarifying,
    /// Result derived and cached
    Terminal,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::CategorySelect
    }
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CategorySelect => "CATEGORY_SELECT",
            Self::Questioning => "QUESTIONING",
            Self::Clarifying => "CLARIFYING",
            Self::Terminal => "TERMINAL",
        }
    }

    /// Whether an answer submission can advance the session
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Self::Questioning | Self::Clarifying)
    }

    /// CATEGORY_SELECT -> QUESTIONING
    pub fn begin_questioning(self) -> DiagnosisResult<Self> {
        match self {
            Self::CategorySelect => Ok(Self::Questioning),
            _ => Err(forbidden(self, Self::Questioning)),
        }
    }

    /// QUESTIONING -> CLARIFYING
    pub fn begin_clarifying(self) -> DiagnosisResult<Self> {
        match self {
            Self::Questioning => Ok(Self::Clarifying),
            _ => Err(forbidden(self, Self::Clarifying)),
        }
    }

    /// CLARIFYING -> QUESTIONING
    pub fn resume_questioning(self) -> DiagnosisResult<Self> {
        match self {
            Self::Clarifying => Ok(Self::Questioning),
            _ => Err(forbidden(self, Self::Questioning)),
        }
    }

    /// QUESTIONING | CLARIFYING -> TERMINAL
    pub fn finalize(self) -> DiagnosisResult<Self> {
        match self {
            Self::Questioning | Self::Clarifying => Ok(Self::Terminal),
            _ => Err(forbidden(self, Self::Terminal)),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn forbidden(from: SessionState, to: SessionState) -> DiagnosisError {
    DiagnosisError::InvalidState(format!("transition {} -> {} is not allowed", from, to))
}
