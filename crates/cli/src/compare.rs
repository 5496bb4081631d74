//! `dwatch compare` — multi-sample id diff between the two revisions.
//!
//! Per query: N probes against each revision, full cross-product diff,
//! keep the least-different pairing. Only pairings with a nonzero diff
//! produce rows, so a clean migration produces an empty report.

use std::path::Path;
use std::thread;

use driftwatch_engine::diff::best_pairing;
use driftwatch_engine::model::{BestPairing, IdSample, Revision};

use crate::config::HarnessConfig;
use crate::reports::{self, DiffRow};
use crate::{read_queries, CliError};

pub fn cmd_compare(
    queries_path: &Path,
    config_path: &Path,
    out: &Path,
    samples_override: Option<usize>,
) -> Result<(), CliError> {
    let config = HarnessConfig::load(config_path)?;
    let queries = read_queries(queries_path)?;
    let samples = samples_override.unwrap_or(config.probe.samples).max(1);

    let old_client = config.client_for(Revision::Old, config.policy())?;
    let new_client = config.client_for(Revision::New, config.policy())?;

    let mut writer = reports::create_csv(out)?;

    let mut processed = 0usize;
    let mut queries_with_diffs = 0usize;
    let mut total_diff_items = 0usize;

    for query in &queries {
        let old_samples: Vec<IdSample> = old_client
            .collect(query, samples, config.probe_gap())
            .iter()
            .map(|p| p.sample())
            .collect();
        let new_samples: Vec<IdSample> = new_client
            .collect(query, samples, config.probe_gap())
            .iter()
            .map(|p| p.sample())
            .collect();

        processed += 1;

        if old_samples.len() < samples || new_samples.len() < samples {
            eprintln!(
                "warning: incomplete sampling for query {:?} (old: {}/{}, new: {}/{})",
                query,
                old_samples.len(),
                samples,
                new_samples.len(),
                samples,
            );
        }

        let Some(best) = best_pairing(&old_samples, &new_samples) else {
            eprintln!("warning: no samples for query {:?}; skipped", query);
            continue;
        };

        if best.report.is_clean() {
            eprintln!(
                "[{processed}/{}] {:?}: consistent (best combo {})",
                queries.len(),
                query,
                best.combo_label,
            );
        } else {
            queries_with_diffs += 1;
            total_diff_items += best.report.total_diff_count;

            eprintln!(
                "[{processed}/{}] {:?}: {} difference(s) (best combo {})",
                queries.len(),
                query,
                best.report.total_diff_count,
                best.combo_label,
            );

            let timestamp = reports::now_stamp();
            for row in diff_rows(query, &best, &timestamp) {
                writer
                    .serialize(row)
                    .map_err(|e| CliError::output(format!("CSV write error: {e}")))?;
            }
            writer
                .flush()
                .map_err(|e| CliError::output(format!("CSV flush error: {e}")))?;
        }

        if processed < queries.len() && !config.query_gap().is_zero() {
            thread::sleep(config.query_gap());
        }
    }

    writer
        .flush()
        .map_err(|e| CliError::output(format!("CSV flush error: {e}")))?;

    eprintln!();
    eprintln!("{:=<56}", "");
    eprintln!("queries processed:      {processed}/{}", queries.len());
    eprintln!("queries with diffs:     {queries_with_diffs}");
    eprintln!("total diff rows:        {total_diff_items}");
    eprintln!("{:=<56}", "");

    Ok(())
}

/// Expand the winning pairing into report rows: one per set-difference id,
/// one per order change.
fn diff_rows(query: &str, best: &BestPairing, timestamp: &str) -> Vec<DiffRow> {
    let report = &best.report;
    let mut rows = Vec::with_capacity(report.total_diff_count);

    for id in &report.only_in_old {
        rows.push(DiffRow {
            question: query.to_string(),
            old_id: id.clone(),
            new_id: String::new(),
            diff_type: "only_in_old".into(),
            timestamp: timestamp.to_string(),
            old_traceid: best.old_correlation_id.clone(),
            new_traceid: String::new(),
            position: String::new(),
            total_diff_count: report.total_diff_count,
            source_combo: best.combo_label.clone(),
        });
    }

    for id in &report.only_in_new {
        rows.push(DiffRow {
            question: query.to_string(),
            old_id: String::new(),
            new_id: id.clone(),
            diff_type: "only_in_new".into(),
            timestamp: timestamp.to_string(),
            old_traceid: String::new(),
            new_traceid: best.new_correlation_id.clone(),
            position: String::new(),
            total_diff_count: report.total_diff_count,
            source_combo: best.combo_label.clone(),
        });
    }

    for change in &report.order_changes {
        rows.push(DiffRow {
            question: query.to_string(),
            old_id: change.old_id.clone(),
            new_id: change.new_id.clone(),
            diff_type: "order_diff".into(),
            timestamp: timestamp.to_string(),
            old_traceid: best.old_correlation_id.clone(),
            new_traceid: best.new_correlation_id.clone(),
            position: change.position.to_string(),
            total_diff_count: report.total_diff_count,
            source_combo: best.combo_label.clone(),
        });
    }

    rows
}
