//! In-memory session store

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use super::errors::{StoreError, StoreResult};
use super::{SessionStore, DEFAULT_IDLE_MINUTES};
use crate::session::DiagnosticSession;

#[derive(Debug, Clone)]
struct StoredSession {
    session: DiagnosticSession,
    touched_at: DateTime<Utc>,
}

/// Process-local store, used by tests and single-node deployments
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, StoredSession>>,
    idle_ttl: Duration,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_idle_ttl(Duration::minutes(DEFAULT_IDLE_MINUTES))
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Number of stored sessions, expired ones included until evicted
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_idle(&self, stored: &StoredSession, now: DateTime<Utc>) -> bool {
        now - stored.touched_at > self.idle_ttl
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("Lock poisoned".to_string())
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, session_id: &str) -> StoreResult<DiagnosticSession> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        match sessions.get(session_id) {
            Some(stored) if !self.is_idle(stored, Utc::now()) => Ok(stored.session.clone()),
            _ => Err(StoreError::NotFound(session_id.to_string())),
        }
    }

    fn save(&self, session: &DiagnosticSession, expected_version: u64) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        let now = Utc::now();

        // an expired entry counts as absent
        let actual = sessions
            .get(&session.session_id)
            .filter(|stored| !self.is_idle(stored, now))
            .map(|stored| stored.session.version)
            .unwrap_or(0);

        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                session_id: session.session_id.clone(),
                expected: expected_version,
                actual,
            });
        }

        let new_version = expected_version + 1;
        let mut stored = session.clone();
        stored.version = new_version;
        sessions.insert(
            session.session_id.clone(),
            StoredSession {
                session: stored,
                touched_at: now,
            },
        );
        Ok(new_version)
    }

    fn evict_idle(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        let before = sessions.len();
        sessions.retain(|_, stored| !self.is_idle(stored, now));
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_load() {
        let store = InMemorySessionStore::new();
        let session = DiagnosticSession::new("a");

        assert_eq!(store.save(&session, 0).unwrap(), 1);
        let loaded = store.load("a").unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.session_id, "a");
    }

    #[test]
    fn test_missing_session() {
        let store = InMemorySessionStore::new();
        assert_eq!(
            store.load("nope").unwrap_err(),
            StoreError::NotFound("nope".to_string())
        );
    }

    #[test]
    fn test_create_twice_conflicts() {
        let store = InMemorySessionStore::new();
        let session = DiagnosticSession::new("a");
        store.save(&session, 0).unwrap();

        let err = store.save(&session, 0).unwrap_err();
        assert_eq!(
            err,
            StoreError::VersionConflict {
                session_id: "a".to_string(),
                expected: 0,
                actual: 1
            }
        );
    }

    #[test]
    fn test_stale_write_rejected() {
        let store = InMemorySessionStore::new();
        let mut session = DiagnosticSession::new("a");
        for expected in 0..3 {
            store.save(&session, expected).unwrap();
        }
        session = store.load("a").unwrap();
        assert_eq!(session.version, 3);

        // two writers both read version 3
        let first = session.clone();
        let second = session.clone();
        assert_eq!(store.save(&first, first.version).unwrap(), 4);
        assert!(matches!(
            store.save(&second, second.version),
            Err(StoreError::VersionConflict {
                expected: 3,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_idle_sessions_expire_and_evict() {
        let store = InMemorySessionStore::with_idle_ttl(Duration::minutes(10));
        store.save(&DiagnosticSession::new("a"), 0).unwrap();
        store.save(&DiagnosticSession::new("b"), 0).unwrap();

        assert_eq!(store.evict_idle(Utc::now()).unwrap(), 0);
        assert_eq!(store.evict_idle(Utc::now() + Duration::minutes(11)).unwrap(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_session_is_not_found() {
        let store = InMemorySessionStore::with_idle_ttl(Duration::seconds(-1));
        store.save(&DiagnosticSession::new("a"), 0).unwrap();
        assert!(matches!(store.load("a"), Err(StoreError::NotFound(_))));
        // an expired entry can be recreated from scratch
        assert_eq!(store.save(&DiagnosticSession::new("a"), 0).unwrap(), 1);
    }
}
