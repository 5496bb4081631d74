//! `dwatch audit` — per-record field compliance plus cache-bucketed
//! coverage, over both revisions.
//!
//! The violation report is rewritten each run; the coverage counters file
//! is reloaded at start and rewritten after every query, so an interrupted
//! run resumes its totals. No record of which queries were already counted
//! is kept: replaying the same input doubles the counters (at-least-once
//! accumulation).

use std::path::Path;
use std::thread;

use driftwatch_engine::coverage::CoverageCounters;
use driftwatch_engine::model::Revision;
use driftwatch_engine::validate::{join_reasons, validate_record};

use crate::config::HarnessConfig;
use crate::reports::{self, ValidationRow};
use crate::{read_queries, CliError};

/// Attempts per probe when the config leaves the policy unbounded: audit
/// records a request failure as a row instead of waiting out an outage.
const AUDIT_ATTEMPTS: u32 = 3;

pub fn cmd_audit(
    queries_path: &Path,
    config_path: &Path,
    out: &Path,
    coverage_path: &Path,
) -> Result<(), CliError> {
    let config = HarnessConfig::load(config_path)?;
    let queries = read_queries(queries_path)?;

    let old_client = config.client_for(Revision::Old, config.bounded_policy(AUDIT_ATTEMPTS))?;
    let new_client = config.client_for(Revision::New, config.bounded_policy(AUDIT_ATTEMPTS))?;

    let mut counters = load_counters(coverage_path);
    let mut writer = reports::create_csv(out)?;

    let mut violation_rows = 0usize;

    for (i, query) in queries.iter().enumerate() {
        eprintln!("[{}/{}] auditing {:?}", i + 1, queries.len(), query);

        for revision in Revision::ALL {
            let client = match revision {
                Revision::Old => &old_client,
                Revision::New => &new_client,
            };
            let probe = match client.probe(query) {
                Ok(probe) => probe,
                Err(e) => {
                    violation_rows += 1;
                    write_row(
                        &mut writer,
                        ValidationRow::error(revision.label(), query, format!("request failed: {e}")),
                    );
                    continue;
                }
            };

            let cache_flag = probe.response.cache_flag();
            let bucket = probe.response.cache_bucket();

            let Some(records) = probe.response.records() else {
                violation_rows += 1;
                let mut row = ValidationRow::error(
                    revision.label(),
                    query,
                    "response 'data' field is not a list".into(),
                );
                row.is_cache_present = cache_flag.is_some();
                row.is_cache_value = reports::cache_value(cache_flag);
                write_row(&mut writer, row);
                continue;
            };

            for record in &records {
                let reasons = validate_record(record);
                if reasons.is_empty() {
                    continue;
                }
                violation_rows += 1;
                eprintln!(
                    "  [{}] non-compliant record {}: {}",
                    revision.label(),
                    record.id,
                    join_reasons(&reasons),
                );
                write_row(
                    &mut writer,
                    ValidationRow {
                        endpoint: revision.label().into(),
                        id: record.id.clone(),
                        title: record.title.clone(),
                        show_time: record.show_time.clone(),
                        source: record.source.clone(),
                        information_type: record.information_type.clone(),
                        jump_url: record.jump_url.clone(),
                        current_query: record.current_query.clone(),
                        original_query: record.original_query.clone(),
                        input_query: query.clone(),
                        is_cache_present: cache_flag.is_some(),
                        is_cache_value: reports::cache_value(cache_flag),
                        invalid_reasons: join_reasons(&reasons),
                        process_time: reports::now_stamp(),
                    },
                );
            }

            counters.record_all(
                revision,
                bucket,
                records.iter().map(|r| r.information_type.as_str()),
            );
        }

        // Full rewrite after every query: a crash loses at most one query.
        persist_counters(&counters, coverage_path);

        if let Err(e) = writer.flush() {
            eprintln!("warning: cannot flush {}: {}", out.display(), e);
        }

        if i + 1 < queries.len() && !config.query_gap().is_zero() {
            thread::sleep(config.query_gap());
        }
    }

    writer
        .flush()
        .map_err(|e| CliError::output(format!("CSV flush error: {e}")))?;

    eprintln!();
    eprintln!("audit complete: {} queries, {} violation row(s)", queries.len(), violation_rows);
    eprintln!("validation report: {}", out.display());
    eprintln!("coverage counters: {}", coverage_path.display());

    Ok(())
}

/// Reload a prior snapshot so totals accumulate across runs. Any problem
/// (missing, empty, unparsable) starts the counters from zero with a note.
fn load_counters(path: &Path) -> CoverageCounters {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => {
            eprintln!("note: coverage file {} is empty; starting from zero", path.display());
            CoverageCounters::new()
        }
        Ok(contents) => match CoverageCounters::from_csv(&contents) {
            Ok(counters) => {
                eprintln!("note: resuming coverage totals from {}", path.display());
                counters
            }
            Err(e) => {
                eprintln!(
                    "warning: cannot parse coverage file {} ({}); starting from zero",
                    path.display(),
                    e,
                );
                CoverageCounters::new()
            }
        },
        Err(_) => {
            eprintln!("note: no coverage file at {}; starting from zero", path.display());
            CoverageCounters::new()
        }
    }
}

/// Persistence failures degrade to a warning: the run continues on the
/// in-memory totals.
fn persist_counters(counters: &CoverageCounters, path: &Path) {
    match counters.to_csv() {
        Ok(csv) => {
            if let Err(e) = std::fs::write(path, csv) {
                eprintln!("warning: cannot write coverage file {}: {}", path.display(), e);
            }
        }
        Err(e) => eprintln!("warning: cannot render coverage counters: {e}"),
    }
}

fn write_row(writer: &mut csv::Writer<std::fs::File>, row: ValidationRow) {
    if let Err(e) = writer.serialize(row) {
        eprintln!("warning: cannot write validation row: {e}");
    }
}
