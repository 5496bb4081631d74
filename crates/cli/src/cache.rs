//! `dwatch cache` — cache-status probe across a worker pool.
//!
//! Workers pull queries from a shared queue and issue one probe each
//! against the new revision. The output CSV is append-only and the writer
//! sits behind a mutex: one critical section per query keeps rows
//! line-atomic.

use std::path::Path;
use std::sync::Mutex;

use driftwatch_engine::model::Revision;

use crate::config::HarnessConfig;
use crate::pool::run_pool;
use crate::reports::{self, CacheRow, CACHE_HEADER};
use crate::{read_queries, CliError};

pub fn cmd_cache(
    queries_path: &Path,
    config_path: &Path,
    out: &Path,
    workers_override: Option<usize>,
) -> Result<(), CliError> {
    let config = HarnessConfig::load(config_path)?;
    let queries = read_queries(queries_path)?;
    let workers = workers_override.unwrap_or(config.probe.workers);

    let client = config.client_for(Revision::New, config.policy())?;
    let writer = Mutex::new(reports::append_csv(out, &CACHE_HEADER)?);

    eprintln!(
        "probing cache status for {} queries with {} worker(s)…",
        queries.len(),
        workers.max(1),
    );

    run_pool(workers, queries, |query| {
        let probe = match client.probe(&query) {
            Ok(probe) => probe,
            Err(e) => {
                eprintln!("warning: query {:?} dropped: {}", query, e);
                return;
            }
        };

        let extra = probe.response.extra_infos.as_ref();
        let row = CacheRow {
            query: query.clone(),
            trace_id: probe.response.trace_id.clone().unwrap_or_default(),
            cache_trace_id: extra
                .and_then(|e| e.cache_trace_id.clone())
                .unwrap_or_default(),
            is_cache: reports::cache_value(probe.response.cache_flag()),
            decomposed_queries: extra
                .and_then(|e| e.decomposed_queries.as_ref())
                .map(|qs| qs.join("; "))
                .unwrap_or_default(),
        };

        eprintln!(
            "query {:?} done (cache: {})",
            query,
            if row.is_cache.is_empty() { "unknown" } else { &row.is_cache },
        );

        let mut writer = writer.lock().expect("cache writer poisoned");
        if let Err(e) = writer.serialize(row) {
            eprintln!("warning: cannot write cache row for {:?}: {}", query, e);
        }
        if let Err(e) = writer.flush() {
            eprintln!("warning: cannot flush {}: {}", out.display(), e);
        }
    });

    eprintln!("cache report written to {}", out.display());
    Ok(())
}
