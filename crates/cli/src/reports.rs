//! CSV report rows and writers.
//!
//! Row structs serialize in field order (serde default), so struct layout
//! IS the column contract: reorder fields and every downstream spreadsheet
//! breaks. Headers come from the struct field names.

use std::fs::{File, OpenOptions};
use std::path::Path;

use serde::Serialize;

use crate::CliError;

// ── Row schemas ─────────────────────────────────────────────────────

/// One diff row: a set difference or an order change from the winning
/// pairing of `dwatch compare`.
#[derive(Debug, Serialize)]
pub struct DiffRow {
    pub question: String,
    pub old_id: String,
    pub new_id: String,
    pub diff_type: String,
    pub timestamp: String,
    pub old_traceid: String,
    pub new_traceid: String,
    pub position: String,
    pub total_diff_count: usize,
    pub source_combo: String,
}

/// One validation row: a non-compliant record, a structural response error,
/// or a failed request.
#[derive(Debug, Serialize)]
pub struct ValidationRow {
    pub endpoint: String,
    pub id: String,
    pub title: String,
    pub show_time: String,
    pub source: String,
    pub information_type: String,
    pub jump_url: String,
    pub current_query: String,
    pub original_query: String,
    pub input_query: String,
    pub is_cache_present: bool,
    pub is_cache_value: String,
    pub invalid_reasons: String,
    pub process_time: String,
}

impl ValidationRow {
    /// Row skeleton for non-record errors (request failure, structural
    /// `data` error) where there is no record to copy fields from.
    pub fn error(endpoint: &str, input_query: &str, reason: String) -> Self {
        Self {
            endpoint: endpoint.into(),
            id: "ERROR".into(),
            title: "ERROR".into(),
            show_time: String::new(),
            source: String::new(),
            information_type: String::new(),
            jump_url: String::new(),
            current_query: String::new(),
            original_query: String::new(),
            input_query: input_query.into(),
            is_cache_present: false,
            is_cache_value: String::new(),
            invalid_reasons: reason,
            process_time: now_stamp(),
        }
    }
}

/// One cache-status row from `dwatch cache`.
#[derive(Debug, Serialize)]
pub struct CacheRow {
    pub query: String,
    pub trace_id: String,
    pub cache_trace_id: String,
    pub is_cache: String,
    pub decomposed_queries: String,
}

pub const CACHE_HEADER: [&str; 5] = [
    "query",
    "trace_id",
    "cache_trace_id",
    "is_cache",
    "decomposed_queries",
];

/// One category-steering row from `dwatch category`.
#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub question: String,
    pub requested_type: String,
    pub actual_type: String,
    pub trace_id: String,
    pub empty_response: String,
}

// ── Writers ─────────────────────────────────────────────────────────

/// Create (truncate) a CSV report. The first serialized row emits the
/// header automatically.
pub fn create_csv(path: &Path) -> Result<csv::Writer<File>, CliError> {
    let file = File::create(path).map_err(|e| {
        CliError::output(format!("cannot create {}: {}", path.display(), e))
    })?;
    Ok(csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file))
}

/// Open a CSV report for appending, writing `header` first when the file is
/// new or empty, so reruns keep extending one report.
pub fn append_csv(path: &Path, header: &[&str]) -> Result<csv::Writer<File>, CliError> {
    let fresh = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CliError::output(format!("cannot open {}: {}", path.display(), e)))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    if fresh {
        writer
            .write_record(header)
            .and_then(|()| writer.flush().map_err(Into::into))
            .map_err(|e| CliError::output(format!("cannot write header to {}: {}", path.display(), e)))?;
    }

    Ok(writer)
}

/// Timestamp format shared by every report row.
pub fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render an `isCache` flag the way reports expect: empty when absent.
pub fn cache_value(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "true".into(),
        Some(false) => "false".into(),
        None => String::new(),
    }
}
