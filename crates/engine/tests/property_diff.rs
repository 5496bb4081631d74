// Property-based tests for the id-sequence diff engine.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;

use driftwatch_engine::diff::{best_pairing, compare_ids};
use driftwatch_engine::model::IdSample;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Short ids drawn from a small alphabet so collisions (shared ids,
/// duplicates within one sequence) are common.
fn arb_id() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => r"[a-e]",
        1 => r"[a-z]{2,6}",
    ]
}

fn arb_ids(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_id(), 0..=max_len)
}

fn samples(seqs: Vec<Vec<String>>, prefix: &str) -> Vec<IdSample> {
    seqs.into_iter()
        .enumerate()
        .map(|(i, ids)| IdSample {
            ids,
            correlation_id: format!("{prefix}_{}", i + 1),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// compare_ids invariants
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn count_identity(old in arb_ids(10), new in arb_ids(10)) {
        let report = compare_ids(&old, &new);
        prop_assert_eq!(
            report.total_diff_count,
            report.set_diff_count + report.order_diff_count
        );
        prop_assert_eq!(
            report.set_diff_count,
            report.only_in_old.len() + report.only_in_new.len()
        );
    }

    #[test]
    fn order_never_inspected_under_set_diff(old in arb_ids(10), new in arb_ids(10)) {
        let report = compare_ids(&old, &new);
        if report.set_diff {
            prop_assert!(report.order_changes.is_empty());
            prop_assert!(!report.order_diff);
            prop_assert_eq!(report.total_diff_count, report.set_diff_count);
        } else {
            prop_assert!(report.only_in_old.is_empty());
            prop_assert!(report.only_in_new.is_empty());
        }
    }

    #[test]
    fn set_diff_matches_set_arithmetic(old in arb_ids(10), new in arb_ids(10)) {
        let report = compare_ids(&old, &new);
        let old_set: HashSet<&String> = old.iter().collect();
        let new_set: HashSet<&String> = new.iter().collect();
        prop_assert_eq!(report.set_diff, old_set != new_set);
        prop_assert_eq!(report.only_in_old.len(), old_set.difference(&new_set).count());
        prop_assert_eq!(report.only_in_new.len(), new_set.difference(&old_set).count());
    }

    #[test]
    fn identical_sequences_always_clean(ids in arb_ids(10)) {
        let report = compare_ids(&ids, &ids);
        prop_assert_eq!(report.total_diff_count, 0);
        prop_assert!(!report.set_diff);
        prop_assert!(!report.order_diff);
    }

    #[test]
    fn diff_is_symmetric_in_count(old in arb_ids(10), new in arb_ids(10)) {
        let forward = compare_ids(&old, &new);
        let backward = compare_ids(&new, &old);
        prop_assert_eq!(forward.total_diff_count, backward.total_diff_count);
    }
}

// ---------------------------------------------------------------------------
// best_pairing invariants
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn best_pairing_is_globally_minimal(
        old_seqs in proptest::collection::vec(arb_ids(6), 1..4),
        new_seqs in proptest::collection::vec(arb_ids(6), 1..4),
    ) {
        let old = samples(old_seqs.clone(), "old");
        let new = samples(new_seqs.clone(), "new");

        let best = best_pairing(&old, &new).expect("both sides populated");

        for o in &old_seqs {
            for n in &new_seqs {
                prop_assert!(
                    best.report.total_diff_count <= compare_ids(o, n).total_diff_count
                );
            }
        }
    }

    #[test]
    fn shared_sample_means_clean_pairing(
        shared in arb_ids(6),
        noise in arb_ids(6),
    ) {
        let old = samples(vec![noise, shared.clone()], "old");
        let new = samples(vec![shared], "new");

        let best = best_pairing(&old, &new).expect("both sides populated");
        prop_assert_eq!(best.report.total_diff_count, 0);
    }
}
