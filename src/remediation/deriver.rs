//! Remediation deriver
//!
//! Maps the final ledger to a recommendation. Runs exactly once per session;
//! the engine caches the result on the session.

use super::profile::profile_for;
use super::result::{
    FinalResult, HypothesisSummary, PathKind, RankedHypothesis, SolutionPath, TimeEstimate,
};
use crate::catalog::{CategoryBank, Hypothesis};
use crate::engine::{DiagnosisError, DiagnosisResult};
use crate::session::{DiagnosticSession, TerminationReason};

/// Top weight below which a workshop is always recommended. Fixed, unlike
/// the configurable threshold that stops the interview.
pub const WORKSHOP_CONFIDENCE: f64 = 70.0;

/// Derive the final result for a finished session.
///
/// `workshop_recommended` is set when the top weight is below
/// `WORKSHOP_CONFIDENCE` or the top hypothesis is safety relevant. Paths are
/// ordered by ascending cost, except that a recommended workshop is moved to
/// the front.
pub fn derive(
    session: &DiagnosticSession,
    bank: &CategoryBank,
    reason: TerminationReason,
) -> DiagnosisResult<FinalResult> {
    let top = session
        .ledger
        .top()
        .ok_or_else(|| DiagnosisError::InvalidState("ledger is empty".to_string()))?;
    let hypothesis = lookup(bank, &top.hypothesis_id)?;

    let workshop_recommended = top.weight < WORKSHOP_CONFIDENCE || hypothesis.safety_relevant;
    let solution_paths = solution_paths(bank, hypothesis, workshop_recommended);

    let ranking = session
        .ledger
        .ranked()
        .into_iter()
        .map(|entry| {
            lookup(bank, &entry.hypothesis_id).map(|h| RankedHypothesis {
                id: h.id.clone(),
                display_name: h.display_name.clone(),
                weight: entry.weight,
            })
        })
        .collect::<DiagnosisResult<Vec<_>>>()?;

    Ok(FinalResult {
        top_hypothesis: HypothesisSummary {
            id: hypothesis.id.clone(),
            display_name: hypothesis.display_name.clone(),
            safety_relevant: hypothesis.safety_relevant,
        },
        confidence: top.weight,
        safety_score: session.safety_score(),
        urgency: session.safety.urgency(),
        workshop_recommended,
        cost_range: hypothesis.cost_range.clone(),
        solution_paths,
        termination_reason: reason,
        ranking,
        answered_count: session.answered_count,
        vehicle_context: session.vehicle_context.clone(),
        location_context: session.location_context.clone(),
    })
}

fn lookup<'a>(bank: &'a CategoryBank, id: &str) -> DiagnosisResult<&'a Hypothesis> {
    bank.hypothesis(id).ok_or_else(|| {
        DiagnosisError::Configuration(format!(
            "ledger references hypothesis '{}' missing from category '{}'",
            id, bank.category
        ))
    })
}

fn solution_paths(
    bank: &CategoryBank,
    hypothesis: &Hypothesis,
    workshop_recommended: bool,
) -> Vec<SolutionPath> {
    let mut paths: Vec<SolutionPath> = profile_for(bank.category)
        .paths()
        .iter()
        .map(|p| SolutionPath {
            kind: p.kind,
            cost_estimate: hypothesis.cost_range.scaled(p.cost_factor),
            time_estimate: TimeEstimate {
                min_hours: p.hours.0,
                max_hours: p.hours.1,
            },
            difficulty: p.difficulty,
        })
        .collect();

    paths.sort_by_key(|p| (p.cost_estimate.min, p.cost_estimate.max));

    if workshop_recommended {
        if let Some(pos) = paths.iter().position(|p| p.kind == PathKind::Workshop) {
            let workshop = paths.remove(pos);
            paths.insert(0, workshop);
        }
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};
    use crate::ledger::{Ledger, LedgerEntry};
    use crate::safety::Urgency;
    use serde_json::json;

    fn session_with(bank: &CategoryBank, weights: &[f64]) -> DiagnosticSession {
        let mut session = DiagnosticSession::new("s");
        session.category = Some(bank.category);
        let entries: Vec<LedgerEntry> = bank
            .hypotheses
            .iter()
            .zip(weights)
            .map(|(h, w)| LedgerEntry {
                hypothesis_id: h.id.clone(),
                weight: *w,
            })
            .collect();
        session.ledger = serde_json::from_value(json!({ "entries": entries })).unwrap();
        session
    }

    fn kinds(result: &FinalResult) -> Vec<PathKind> {
        result.solution_paths.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_confident_non_safety_orders_by_cost() {
        let catalog = Catalog::builtin().unwrap();
        let bank = catalog.bank(Category::Brakes).unwrap();
        let session = session_with(bank, &[72.8, 8.8, 5.6, 6.4, 6.4]);

        let result = derive(&session, bank, TerminationReason::ConfidenceReached).unwrap();

        assert_eq!(result.top_hypothesis.id, "worn_pads");
        assert!(!result.workshop_recommended);
        assert_eq!(kinds(&result), vec![PathKind::Diy, PathKind::Hybrid, PathKind::Workshop]);
        assert_eq!(result.cost_range, bank.hypotheses[0].cost_range);
        // DIY is 40% of 120..280
        assert_eq!(result.solution_paths[0].cost_estimate.min, 48);
        assert_eq!(result.solution_paths[0].cost_estimate.max, 112);
    }

    #[test]
    fn test_low_confidence_promotes_workshop() {
        let catalog = Catalog::builtin().unwrap();
        let bank = catalog.bank(Category::Brakes).unwrap();
        let session = session_with(bank, &[40.0, 20.0, 15.0, 10.0, 15.0]);

        let result = derive(&session, bank, TerminationReason::BudgetExhausted).unwrap();

        assert!(result.workshop_recommended);
        assert_eq!(kinds(&result), vec![PathKind::Workshop, PathKind::Diy, PathKind::Hybrid]);
        assert_eq!(result.termination_reason, TerminationReason::BudgetExhausted);
    }

    #[test]
    fn test_safety_relevant_promotes_workshop_even_when_confident() {
        let catalog = Catalog::builtin().unwrap();
        let bank = catalog.bank(Category::Brakes).unwrap();
        // brake_fluid_leak is safety relevant
        let session = session_with(bank, &[5.0, 5.0, 5.0, 80.0, 5.0]);

        let result = derive(&session, bank, TerminationReason::ConfidenceReached).unwrap();

        assert_eq!(result.top_hypothesis.id, "brake_fluid_leak");
        assert!(result.top_hypothesis.safety_relevant);
        assert!(result.workshop_recommended);
        assert_eq!(result.solution_paths[0].kind, PathKind::Workshop);
    }

    #[test]
    fn test_always_three_paths_and_full_ranking() {
        let catalog = Catalog::builtin().unwrap();
        for category in Category::ALL {
            let bank = catalog.bank(category).unwrap();
            let mut session = DiagnosticSession::new("s");
            session.ledger = Ledger::from_base(bank);
            let result = derive(&session, bank, TerminationReason::BankExhausted).unwrap();
            assert_eq!(result.solution_paths.len(), 3);
            assert_eq!(result.ranking.len(), bank.hypotheses.len());
            assert!(result.ranking.windows(2).all(|w| w[0].weight >= w[1].weight));
        }
    }

    #[test]
    fn test_context_and_safety_pass_through() {
        let catalog = Catalog::builtin().unwrap();
        let bank = catalog.bank(Category::Climate).unwrap();
        let mut session = DiagnosticSession::new("s")
            .with_context(Some(json!({"model": "Golf"})), Some(json!({"zip": "10115"})));
        session.ledger = Ledger::from_base(bank);

        let result = derive(&session, bank, TerminationReason::BankExhausted).unwrap();
        assert_eq!(result.vehicle_context, Some(json!({"model": "Golf"})));
        assert_eq!(result.location_context, Some(json!({"zip": "10115"})));
        assert_eq!(result.safety_score, 100);
        assert_eq!(result.urgency, Urgency::Low);
    }

    #[test]
    fn test_empty_ledger_is_invalid_state() {
        let catalog = Catalog::builtin().unwrap();
        let bank = catalog.bank(Category::Engine).unwrap();
        let session = DiagnosticSession::new("s");
        let err = derive(&session, bank, TerminationReason::BankExhausted).unwrap_err();
        assert!(matches!(err, DiagnosisError::InvalidState(_)));
    }

    #[test]
    fn test_workshop_cutoff_ignores_stop_threshold() {
        let catalog = Catalog::builtin().unwrap();
        let bank = catalog.bank(Category::Brakes).unwrap();
        // worn_pads at 67 is not safety relevant but sits under the cutoff
        let session = session_with(bank, &[67.0, 10.0, 8.0, 7.0, 8.0]);

        let result = derive(&session, bank, TerminationReason::ConfidenceReached).unwrap();
        assert!(result.workshop_recommended);
        assert_eq!(result.solution_paths[0].kind, PathKind::Workshop);
    }
}
