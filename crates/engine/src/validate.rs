//! Rule-based per-record compliance validation.

use crate::model::{InfoType, ResultRecord};
use crate::rules::{IdPrefixRule, OWNED_PREFIXES};

/// Validate one record against the per-category schema.
///
/// Every rule runs independently; nothing short-circuits, so one record can
/// carry several violations at once. Each violated rule contributes one
/// human-readable reason, in a fixed order: required fields, conditional
/// `source`, conditional `jumpUrl`, id prefix.
pub fn validate_record(record: &ResultRecord) -> Vec<String> {
    let mut reasons = Vec::new();

    for (name, value) in [
        ("title", &record.title),
        ("showTime", &record.show_time),
        ("informationType", &record.information_type),
    ] {
        if value.is_empty() {
            reasons.push(format!("{name} is empty (null or '')"));
        }
    }

    // Conditional rules only apply to categories in the closed set; unknown
    // wire categories are skipped, not failed.
    if let Some(info_type) = record.info_type() {
        let rules = info_type.rules();

        if rules.needs_source && record.source.is_empty() {
            reasons.push(format!("source is empty (null or '') but {info_type} requires it"));
        }
        if rules.needs_jump_url && record.jump_url.is_empty() {
            reasons.push(format!("jumpUrl is empty (null or '') but {info_type} requires it"));
        }

        if !record.id.is_empty() {
            if let Some(reason) = check_id_prefix(&record.id, info_type) {
                reasons.push(reason);
            }
        }
    }

    reasons
}

/// The persisted form of a record's violations.
pub fn join_reasons(reasons: &[String]) -> String {
    reasons.join("; ")
}

/// Check an id against its category's prefix convention.
fn check_id_prefix(id: &str, info_type: InfoType) -> Option<String> {
    match info_type.rules().id_prefix {
        IdPrefixRule::Unchecked => None,
        IdPrefixRule::NoPrefix => {
            if OWNED_PREFIXES.iter().any(|p| id.starts_with(p)) {
                Some(format!(
                    "id should carry no prefix but starts with: {}",
                    head(id, 2)
                ))
            } else {
                None
            }
        }
        IdPrefixRule::Prefix(expected) => {
            if id.starts_with(expected) {
                None
            } else {
                Some(format!(
                    "id prefix should be {expected} but found: {}",
                    head(id, expected.len())
                ))
            }
        }
    }
}

fn head(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
