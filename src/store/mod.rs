//! Session store
//!
//! Durable keyed storage for diagnostic sessions with optimistic concurrency.
//!
//! ## Invariants
//! - Every successful `save` bumps the stored version by exactly one
//! - A `save` whose expected version differs from the stored one is rejected
//! - Idle sessions expire; the engine itself never deletes a session
//!
//! No lock is held between a `load` and the following `save`.

mod errors;
mod file;
mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use errors::{StoreError, StoreResult};
pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;

use crate::session::DiagnosticSession;

/// Default inactivity window before a session expires
pub const DEFAULT_IDLE_MINUTES: i64 = 30;

/// Keyed session storage with version-checked writes
pub trait SessionStore: Send + Sync {
    /// Load the latest version of a session.
    ///
    /// The returned session carries the stored version in `version`.
    fn load(&self, session_id: &str) -> StoreResult<DiagnosticSession>;

    /// Persist `session` if the stored version still equals `expected_version`.
    ///
    /// `expected_version == 0` means the session must not exist yet.
    /// Returns the new version.
    fn save(&self, session: &DiagnosticSession, expected_version: u64) -> StoreResult<u64>;

    /// Remove sessions idle for longer than the store's window as of `now`.
    /// Returns the number removed.
    fn evict_idle(&self, now: DateTime<Utc>) -> StoreResult<usize>;
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn load(&self, session_id: &str) -> StoreResult<DiagnosticSession> {
        (**self).load(session_id)
    }

    fn save(&self, session: &DiagnosticSession, expected_version: u64) -> StoreResult<u64> {
        (**self).save(session, expected_version)
    }

    fn evict_idle(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        (**self).evict_idle(now)
    }
}
