//! Session Store Concurrency Tests
//!
//! Optimistic versioning across both store backends:
//! - Stale writers are rejected with the version they lost to
//! - Exactly one of many racing writers wins
//! - Conflicts surface to callers as retryable errors

use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use autodiag::catalog::Catalog;
use autodiag::engine::{
    AnswerRequest, CategoryRequest, DiagnosisEngine, DiagnosisError, DiagnosisService,
};
use autodiag::session::{DiagnosticSession, TerminationPolicy};
use autodiag::store::{FileSessionStore, InMemorySessionStore, SessionStore, StoreError};

/// Save `id` three times so it sits at version 3
fn at_version_three(store: &dyn SessionStore, id: &str) {
    let mut session = DiagnosticSession::new(id);
    for expected in 0..3 {
        let version = store.save(&session, expected).unwrap();
        session.version = version;
    }
    assert_eq!(store.load(id).unwrap().version, 3);
}

fn assert_stale_write_rejected(store: &dyn SessionStore) {
    at_version_three(store, "s1");

    let first = store.load("s1").unwrap();
    let second = store.load("s1").unwrap();

    assert_eq!(store.save(&first, 3).unwrap(), 4);
    assert_eq!(
        store.save(&second, 3).unwrap_err(),
        StoreError::VersionConflict {
            session_id: "s1".to_string(),
            expected: 3,
            actual: 4,
        }
    );
    assert_eq!(store.load("s1").unwrap().version, 4);
}

fn assert_single_winner<S: SessionStore + 'static>(store: Arc<S>) {
    at_version_three(&*store, "race");

    let writers = 8;
    let barrier = Arc::new(Barrier::new(writers));
    let handles: Vec<_> = (0..writers)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let session = store.load("race").unwrap();
                barrier.wait();
                store.save(&session, session.version)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            result,
            StoreError::VersionConflict { expected: 3, actual: 4, .. }
        ));
    }
    assert_eq!(store.load("race").unwrap().version, 4);
}

// =============================================================================
// In-memory store
// =============================================================================

#[test]
fn test_memory_store_rejects_stale_write() {
    assert_stale_write_rejected(&InMemorySessionStore::new());
}

#[test]
fn test_memory_store_single_winner() {
    assert_single_winner(Arc::new(InMemorySessionStore::new()));
}

// =============================================================================
// File store
// =============================================================================

#[test]
fn test_file_store_rejects_stale_write() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path()).unwrap();
    assert_stale_write_rejected(&store);
}

#[test]
fn test_file_store_single_winner() {
    let dir = TempDir::new().unwrap();
    assert_single_winner(Arc::new(FileSessionStore::open(dir.path()).unwrap()));
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = FileSessionStore::open(dir.path()).unwrap();
        at_version_three(&store, "durable");
    }
    let reopened = FileSessionStore::open(dir.path()).unwrap();
    assert_eq!(reopened.load("durable").unwrap().version, 3);
}

// =============================================================================
// Service level
// =============================================================================

#[test]
fn test_service_reports_retryable_conflict() {
    let store = Arc::new(InMemorySessionStore::new());
    let service = DiagnosisService::new(
        DiagnosisEngine::new(
            Arc::new(Catalog::builtin().unwrap()),
            TerminationPolicy::default(),
        ),
        Arc::clone(&store),
    );
    service
        .select_category(CategoryRequest {
            session_id: Some("svc".to_string()),
            category: "brakes".to_string(),
            vehicle_context: None,
            location_context: None,
        })
        .unwrap();

    // another writer bumps the version behind the service's back
    let loaded = store.load("svc").unwrap();
    store.save(&loaded, loaded.version).unwrap();
    let bumped = store.load("svc").unwrap();

    // the service reloads, so its own write still lands
    let response = service
        .submit_answer(AnswerRequest {
            session_id: "svc".to_string(),
            question_id: "brakes_squeal".to_string(),
            option_value: "yes".to_string(),
        })
        .unwrap();
    assert_eq!(response.version, 3);

    // the stale copy loses
    let err = DiagnosisError::from(store.save(&bumped, bumped.version).unwrap_err());
    assert!(matches!(
        err,
        DiagnosisError::ConcurrentModification { expected: 2, actual: 3, .. }
    ));
    assert!(err.is_retryable());
}
