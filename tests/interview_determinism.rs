//! Interview Determinism Tests
//!
//! End-to-end interviews through `DiagnosisService` on the built-in catalog:
//! - Confidence, budget and bank termination
//! - Clarification flow
//! - Idempotent replay of a finished session
//! - Identical answers produce identical results

use std::collections::HashMap;
use std::sync::Arc;

use autodiag::catalog::{Catalog, Category, CategoryBank};
use autodiag::engine::{
    AnswerRequest, AnswerResponse, CategoryRequest, DiagnosisEngine, DiagnosisError,
    DiagnosisService,
};
use autodiag::remediation::FinalResult;
use autodiag::safety::Urgency;
use autodiag::session::{TerminationPolicy, TerminationReason};
use autodiag::store::{InMemorySessionStore, SessionStore};

fn service_with(catalog: Catalog) -> DiagnosisService<InMemorySessionStore> {
    DiagnosisService::new(
        DiagnosisEngine::new(Arc::new(catalog), TerminationPolicy::default()),
        InMemorySessionStore::new(),
    )
}

fn service() -> DiagnosisService<InMemorySessionStore> {
    service_with(Catalog::builtin().unwrap())
}

/// Built-in catalog with one category's budget replaced
fn catalog_with_budget(category: Category, budget: usize) -> Catalog {
    let builtin = Catalog::builtin().unwrap();
    let banks: Vec<CategoryBank> = builtin
        .categories()
        .filter_map(|c| builtin.bank(c).cloned())
        .map(|mut bank| {
            if bank.category == category {
                bank.question_budget = budget;
            }
            bank
        })
        .collect();
    Catalog::new(banks).unwrap()
}

fn start(service: &DiagnosisService<InMemorySessionStore>, id: &str, category: &str) -> String {
    let response = service
        .select_category(CategoryRequest {
            session_id: Some(id.to_string()),
            category: category.to_string(),
            vehicle_context: None,
            location_context: None,
        })
        .unwrap();
    response.question.id
}

fn answer(
    service: &DiagnosisService<InMemorySessionStore>,
    id: &str,
    question: &str,
    option: &str,
) -> AnswerResponse {
    service
        .submit_answer(AnswerRequest {
            session_id: id.to_string(),
            question_id: question.to_string(),
            option_value: option.to_string(),
        })
        .unwrap()
}

/// Answer whatever is asked from `choices` until the interview finishes
fn run_interview(
    service: &DiagnosisService<InMemorySessionStore>,
    id: &str,
    category: &str,
    choices: &HashMap<&str, &str>,
) -> (FinalResult, Vec<String>) {
    let mut asked = vec![start(service, id, category)];
    loop {
        let current = asked.last().unwrap().clone();
        let choice = choices
            .get(current.as_str())
            .unwrap_or_else(|| panic!("no choice for {}", current));
        let response = answer(service, id, &current, choice);
        if let Some(result) = response.final_result {
            return (result, asked);
        }
        asked.push(response.question.unwrap().id);
    }
}

fn spongy_brakes() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("brakes_squeal", "no"),
        ("brakes_last_service", "unknown"),
        ("brakes_pedal_feel", "spongy"),
        ("brakes_fluid_level", "yes"),
        ("brakes_burning_smell", "yes"),
        ("brakes_pull", "yes"),
        ("brakes_abs_light", "no"),
    ])
}

// =============================================================================
// Termination
// =============================================================================

/// Two pad-wear answers push worn_pads from 30 to 56 to 72.8.
#[test]
fn test_brakes_reaches_confidence() {
    let service = service();
    assert_eq!(start(&service, "c1", "brakes"), "brakes_squeal");

    let first = answer(&service, "c1", "brakes_squeal", "yes");
    assert!(first.final_result.is_none());
    let snapshot = service.snapshot("c1").unwrap();
    let worn = snapshot
        .ledger
        .iter()
        .find(|e| e.hypothesis_id == "worn_pads")
        .unwrap();
    assert!((worn.weight - 56.0).abs() < 1e-9);

    let second = answer(&service, "c1", "brakes_last_service", "over_30k");
    let result = second.final_result.unwrap();
    assert_eq!(result.top_hypothesis.id, "worn_pads");
    assert!((result.confidence - 72.8).abs() < 1e-9);
    assert_eq!(result.termination_reason, TerminationReason::ConfidenceReached);
    assert_eq!(result.answered_count, 2);
    assert_eq!(result.safety_score, 100);
    assert!(!result.workshop_recommended);
}

/// The clarifying answer counts toward the budget.
#[test]
fn test_clarification_counts_toward_budget() {
    let service = service();
    let (result, asked) = run_interview(&service, "b1", "brakes", &spongy_brakes());

    assert_eq!(
        asked,
        vec![
            "brakes_squeal",
            "brakes_last_service",
            "brakes_pedal_feel",
            "brakes_fluid_level",
            "brakes_burning_smell",
        ]
    );
    assert_eq!(result.termination_reason, TerminationReason::BudgetExhausted);
    assert_eq!(result.answered_count, 5);
    assert_eq!(result.top_hypothesis.id, "brake_fluid_leak");
    assert_eq!(result.safety_score, 45);
    assert_eq!(result.urgency, Urgency::StopDriving);
    assert!(result.workshop_recommended);
}

/// Three safety penalties (30 + 25 + 20) bottom out at the floor.
#[test]
fn test_safety_score_clamps_at_floor() {
    let service = service_with(catalog_with_budget(Category::Brakes, 10));
    let (result, asked) = run_interview(&service, "b2", "brakes", &spongy_brakes());

    assert_eq!(asked.len(), 7);
    assert_eq!(result.termination_reason, TerminationReason::BankExhausted);
    assert_eq!(result.safety_score, 40);
    assert_eq!(result.urgency, Urgency::StopDriving);
}

#[test]
fn test_interviews_never_exceed_budget_plus_one() {
    let catalog = Catalog::builtin().unwrap();
    let service = service();

    for (n, category) in catalog.categories().enumerate() {
        let bank = catalog.bank(category).unwrap();
        let id = format!("bound-{}", n);
        let mut question = start(&service, &id, category.as_str());
        let result = loop {
            // always the last option: least likely to converge early
            let q = service
                .engine()
                .bank(category)
                .unwrap()
                .question(&question)
                .unwrap()
                .clone();
            let value = q.options.last().unwrap().value.clone();
            let response = answer(&service, &id, &question, &value);
            match response.final_result {
                Some(result) => break result,
                None => question = response.question.unwrap().id,
            }
        };
        assert!(result.answered_count <= bank.question_budget + 1);
    }
}

// =============================================================================
// Replay and determinism
// =============================================================================

#[test]
fn test_finished_session_replays_result() {
    let service = service();
    start(&service, "r1", "brakes");
    answer(&service, "r1", "brakes_squeal", "yes");
    let finished = answer(&service, "r1", "brakes_last_service", "over_30k");
    let version = finished.version;

    let replay = answer(&service, "r1", "brakes_abs_light", "yes");
    assert_eq!(replay.final_result, finished.final_result);
    assert_eq!(replay.version, version);
    assert_eq!(service.store().load("r1").unwrap().version, version);
}

#[test]
fn test_same_answers_same_result() {
    let service = service();
    let (a, asked_a) = run_interview(&service, "d1", "brakes", &spongy_brakes());
    let (b, asked_b) = run_interview(&service, "d2", "brakes", &spongy_brakes());

    assert_eq!(asked_a, asked_b);
    assert_eq!(
        serde_json::to_value(&a).unwrap(),
        serde_json::to_value(&b).unwrap()
    );
}

#[test]
fn test_rejected_answer_leaves_session_untouched() {
    let service = service();
    start(&service, "v1", "brakes");
    let before = service.store().load("v1").unwrap();

    let err = service
        .submit_answer(AnswerRequest {
            session_id: "v1".to_string(),
            question_id: "brakes_squeal".to_string(),
            option_value: "sometimes".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, DiagnosisError::UnknownOption { .. }));

    let err = service
        .submit_answer(AnswerRequest {
            session_id: "v1".to_string(),
            question_id: "brakes_pull".to_string(),
            option_value: "yes".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, DiagnosisError::InvalidState(_)));

    assert_eq!(service.store().load("v1").unwrap(), before);
}
