//! Question selector

use super::session::DiagnosticSession;
use crate::catalog::{CategoryBank, Question};

/// First bank question not yet asked, or `None` when the bank is exhausted.
///
/// Clarifying questions live outside the ordered bank, so asking one never
/// moves this pointer.
pub fn next_question<'a>(
    session: &DiagnosticSession,
    bank: &'a CategoryBank,
) -> Option<&'a Question> {
    bank.questions.iter().find(|q| !session.has_asked(&q.id))
}
