//! Evidence Ledger Invariant Tests
//!
//! Every bank in the built-in catalog, every option in order:
//! - Weights stay non-negative and sum to 100
//! - Applying evidence never mutates its input
//! - Ranking is stable and led by `top()`

use autodiag::catalog::{AnswerOption, Catalog};
use autodiag::ledger::{apply_evidence, Ledger, LEDGER_TOTAL, SUM_TOLERANCE};

fn all_options(catalog: &Catalog) -> Vec<(Ledger, AnswerOption)> {
    let mut out = Vec::new();
    for category in catalog.categories() {
        let bank = catalog.bank(category).unwrap();
        let base = Ledger::from_base(bank);
        let clarifying = bank.critical_rules.iter().map(|r| &r.clarifying_question);
        for question in bank.questions.iter().chain(clarifying) {
            for option in &question.options {
                out.push((base.clone(), option.clone()));
            }
        }
    }
    out
}

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn test_every_base_ledger_is_normalized() {
    let catalog = Catalog::builtin().unwrap();
    for category in catalog.categories() {
        let ledger = Ledger::from_base(catalog.bank(category).unwrap());
        assert!(ledger.is_normalized(), "{} base not normalized", category.as_str());
    }
}

#[test]
fn test_single_answers_keep_ledger_normalized() {
    let catalog = Catalog::builtin().unwrap();
    for (base, option) in all_options(&catalog) {
        let next = apply_evidence(&base, &option, &base);
        assert!((next.total() - LEDGER_TOTAL).abs() <= SUM_TOLERANCE);
        assert!(next.entries().iter().all(|e| e.weight >= 0.0));
    }
}

/// Applying every option of a bank in sequence never drifts off 100.
#[test]
fn test_long_chains_stay_normalized() {
    let catalog = Catalog::builtin().unwrap();
    for category in catalog.categories() {
        let bank = catalog.bank(category).unwrap();
        let base = Ledger::from_base(bank);
        let mut ledger = base.clone();
        for _ in 0..10 {
            for question in &bank.questions {
                for option in &question.options {
                    ledger = apply_evidence(&ledger, option, &base);
                    assert!(ledger.is_normalized());
                }
            }
        }
    }
}

// =============================================================================
// Purity and ranking
// =============================================================================

#[test]
fn test_apply_is_pure() {
    let catalog = Catalog::builtin().unwrap();
    for (base, option) in all_options(&catalog) {
        let before = base.clone();
        let a = apply_evidence(&base, &option, &base);
        let b = apply_evidence(&base, &option, &base);
        assert_eq!(base, before);
        assert_eq!(a, b);
    }
}

#[test]
fn test_ranked_is_led_by_top() {
    let catalog = Catalog::builtin().unwrap();
    for (base, option) in all_options(&catalog) {
        let next = apply_evidence(&base, &option, &base);
        let ranked = next.ranked();
        let top = next.top().unwrap();
        assert_eq!(ranked[0].hypothesis_id, top.hypothesis_id);
        assert!(ranked.windows(2).all(|w| w[0].weight >= w[1].weight));
    }
}
