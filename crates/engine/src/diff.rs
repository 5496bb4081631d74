//! Pairwise id-sequence diffing and minimal-difference pairing.

use std::collections::HashSet;

use crate::model::{BestPairing, DiffReport, IdSample, OrderChange};

/// Compare two ranked id sequences.
///
/// Set membership is compared first. Order is only inspected when the two
/// sequences contain the same unique ids; positional comparison under a set
/// mismatch is ill-defined and would double-count the missing ids.
///
/// Sequences may contain duplicate ids (set operations use unique ids), so
/// two sequences can share a set while differing in length; every trailing
/// position of the longer sequence then counts as one order change with an
/// empty counterpart id.
pub fn compare_ids(old_ids: &[String], new_ids: &[String]) -> DiffReport {
    let old_set: HashSet<&str> = old_ids.iter().map(String::as_str).collect();
    let new_set: HashSet<&str> = new_ids.iter().map(String::as_str).collect();
    let set_diff = old_set != new_set;

    // First-appearance order keeps reports deterministic.
    let only_in_old = missing_from(old_ids, &new_set);
    let only_in_new = missing_from(new_ids, &old_set);
    let set_diff_count = only_in_old.len() + only_in_new.len();

    let mut order_diff = false;
    let mut order_changes = Vec::new();
    let mut order_diff_count = 0usize;

    if !set_diff {
        let min_len = old_ids.len().min(new_ids.len());
        for i in 0..min_len {
            if old_ids[i] != new_ids[i] {
                order_diff = true;
                order_diff_count += 1;
                order_changes.push(OrderChange {
                    position: i,
                    old_id: old_ids[i].clone(),
                    new_id: new_ids[i].clone(),
                });
            }
        }

        if old_ids.len() != new_ids.len() {
            order_diff = true;
            order_diff_count += old_ids.len().abs_diff(new_ids.len());
            for i in min_len..old_ids.len().max(new_ids.len()) {
                order_changes.push(OrderChange {
                    position: i,
                    old_id: old_ids.get(i).cloned().unwrap_or_default(),
                    new_id: new_ids.get(i).cloned().unwrap_or_default(),
                });
            }
        }
    }

    DiffReport {
        set_diff,
        order_diff,
        only_in_old,
        only_in_new,
        order_changes,
        set_diff_count,
        order_diff_count,
        total_diff_count: set_diff_count + order_diff_count,
    }
}

/// Unique ids of `ids` absent from `other`, in first-appearance order.
fn missing_from(ids: &[String], other: &HashSet<&str>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut missing = Vec::new();
    for id in ids {
        if !other.contains(id.as_str()) && seen.insert(id.as_str()) {
            missing.push(id.clone());
        }
    }
    missing
}

/// Diff every (old, new) sample combination and keep the pairing with the
/// minimal total difference count. Ties break to the first minimum in
/// old-major, new-minor enumeration order.
///
/// Returns `None` when either side has no samples (the caller skips the
/// query with a warning).
pub fn best_pairing(old_samples: &[IdSample], new_samples: &[IdSample]) -> Option<BestPairing> {
    let mut best: Option<BestPairing> = None;

    for (oi, old) in old_samples.iter().enumerate() {
        for (ni, new) in new_samples.iter().enumerate() {
            let report = compare_ids(&old.ids, &new.ids);
            let better = match &best {
                None => true,
                Some(b) => report.total_diff_count < b.report.total_diff_count,
            };
            if better {
                best = Some(BestPairing {
                    report,
                    old_correlation_id: old.correlation_id.clone(),
                    new_correlation_id: new.correlation_id.clone(),
                    combo_label: format!("old_{}xnew_{}", oi + 1, ni + 1),
                });
            }
        }
    }

    best
}
