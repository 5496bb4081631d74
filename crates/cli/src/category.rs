//! `dwatch category` — category-steering check.
//!
//! For each query × information type, probe with `childSearchType` set and
//! record empty responses plus records whose actual category differs from
//! the requested one.

use std::path::Path;
use std::thread;

use driftwatch_engine::model::{InfoType, Revision};

use crate::config::HarnessConfig;
use crate::reports::{self, CategoryRow};
use crate::{read_queries, CliError};

pub fn cmd_category(queries_path: &Path, config_path: &Path, out: &Path) -> Result<(), CliError> {
    let config = HarnessConfig::load(config_path)?;
    let queries = read_queries(queries_path)?;

    let client = config.client_for(Revision::New, config.policy())?;
    let mut writer = reports::create_csv(out)?;

    let mut mismatch_rows = 0usize;

    for (i, query) in queries.iter().enumerate() {
        eprintln!("[{}/{}] steering {:?}", i + 1, queries.len(), query);

        for requested in InfoType::ALL {
            let probe = match client.probe_category(query, requested) {
                Ok(probe) => probe,
                Err(e) => {
                    // No accepted correlation id exists for a failed probe;
                    // mint one so the row is still traceable.
                    mismatch_rows += 1;
                    write_row(&mut writer, CategoryRow {
                        question: query.clone(),
                        requested_type: requested.wire_name().into(),
                        actual_type: format!("ERROR: {e}"),
                        trace_id: uuid::Uuid::new_v4().to_string(),
                        empty_response: "ERROR".into(),
                    });
                    continue;
                }
            };

            let records = probe.response.records().unwrap_or_default();
            if records.is_empty() {
                mismatch_rows += 1;
                write_row(&mut writer, CategoryRow {
                    question: query.clone(),
                    requested_type: requested.wire_name().into(),
                    actual_type: "EMPTY_RESPONSE".into(),
                    trace_id: probe.correlation_id.clone(),
                    empty_response: "YES".into(),
                });
                continue;
            }

            for record in &records {
                if record.information_type.is_empty()
                    || record.information_type == requested.wire_name()
                {
                    continue;
                }
                mismatch_rows += 1;
                write_row(&mut writer, CategoryRow {
                    question: query.clone(),
                    requested_type: requested.wire_name().into(),
                    actual_type: record.information_type.clone(),
                    trace_id: probe.correlation_id.clone(),
                    empty_response: "NO".into(),
                });
            }
        }

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
    eprintln!(
        "category check complete: {} queries, {} row(s) written to {}",
        queries.len(),
        mismatch_rows,
        out.display(),
    );

    Ok(())
}

fn write_row(writer: &mut csv::Writer<std::fs::File>, row: CategoryRow) {
    if let Err(e) = writer.serialize(row) {
        eprintln!("warning: cannot write category row: {e}");
    }
}
