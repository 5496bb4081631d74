//! Cache-bucketed coverage counters with a resumable CSV snapshot.
//!
//! Snapshot schema v1: one row per information type (sorted), one
//! `count_<revision>_<bucket>` column per (revision, cache bucket)
//! combination, `information_type` as the first column. The snapshot is
//! rewritten whole after every processed query, so a crash loses at most
//! one query's worth of updates.
//!
//! Resuming from a snapshot accumulates on top of prior totals without
//! tracking which queries were already counted: re-running the same input
//! double-counts those queries (at-least-once accumulation). The codec is
//! isolated behind [`CoverageCounters::to_csv`] / [`CoverageCounters::from_csv`]
//! so a processed-query ledger could be added without touching the counting
//! logic.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::EngineError;
use crate::model::{CacheBucket, Revision};

type BucketKey = (Revision, CacheBucket);

/// Counters keyed by (revision, cache bucket, information type).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageCounters {
    counts: BTreeMap<BucketKey, BTreeMap<String, u64>>,
}

impl CoverageCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one record of `info_type`.
    pub fn record(&mut self, revision: Revision, bucket: CacheBucket, info_type: &str) {
        self.add(revision, bucket, info_type, 1);
    }

    /// Add `n` to one counter.
    pub fn add(&mut self, revision: Revision, bucket: CacheBucket, info_type: &str, n: u64) {
        if n == 0 {
            return;
        }
        *self
            .counts
            .entry((revision, bucket))
            .or_default()
            .entry(info_type.to_string())
            .or_insert(0) += n;
    }

    /// Tally one response's worth of record categories. Empty category
    /// strings are not counted.
    pub fn record_all<'a, I>(&mut self, revision: Revision, bucket: CacheBucket, types: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for t in types {
            if !t.is_empty() {
                self.record(revision, bucket, t);
            }
        }
    }

    pub fn get(&self, revision: Revision, bucket: CacheBucket, info_type: &str) -> u64 {
        self.counts
            .get(&(revision, bucket))
            .and_then(|m| m.get(info_type))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|m| m.is_empty())
    }

    /// Every information type seen under any (revision, bucket), sorted.
    pub fn information_types(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.counts.values().flat_map(|m| m.keys()).collect();
        set.into_iter().cloned().collect()
    }

    fn column_name(revision: Revision, bucket: CacheBucket) -> String {
        format!("count_{}_{}", revision.label(), bucket.label())
    }

    fn parse_column(name: &str) -> Option<BucketKey> {
        for revision in Revision::ALL {
            for bucket in CacheBucket::ALL {
                if Self::column_name(revision, bucket) == name {
                    return Some((revision, bucket));
                }
            }
        }
        None
    }

    /// Render the full snapshot. Column order is fixed: revisions in
    /// [`Revision::ALL`] order, buckets in [`CacheBucket::ALL`] order.
    pub fn to_csv(&self) -> Result<String, EngineError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let mut header = vec!["information_type".to_string()];
        for revision in Revision::ALL {
            for bucket in CacheBucket::ALL {
                header.push(Self::column_name(revision, bucket));
            }
        }
        writer
            .write_record(&header)
            .map_err(|e| EngineError::Csv(e.to_string()))?;

        for info_type in self.information_types() {
            let mut row = vec![info_type.clone()];
            for revision in Revision::ALL {
                for bucket in CacheBucket::ALL {
                    row.push(self.get(revision, bucket, &info_type).to_string());
                }
            }
            writer
                .write_record(&row)
                .map_err(|e| EngineError::Csv(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| EngineError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| EngineError::Csv(e.to_string()))
    }

    /// Parse a previously written snapshot. Header-driven: column order is
    /// irrelevant and unrecognized columns are ignored, so older snapshots
    /// keep loading after the column set grows.
    pub fn from_csv(data: &str) -> Result<Self, EngineError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| EngineError::Csv(e.to_string()))?
            .clone();

        if headers.get(0) != Some("information_type") {
            return Err(EngineError::SnapshotHeader(format!(
                "first column is {:?}, expected 'information_type'",
                headers.get(0).unwrap_or("")
            )));
        }

        let columns: Vec<(usize, BucketKey)> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, name)| Self::parse_column(name).map(|key| (i, key)))
            .collect();

        let mut counters = Self::new();
        for record in reader.records() {
            let record = record.map_err(|e| EngineError::Csv(e.to_string()))?;
            let info_type = record.get(0).unwrap_or("");
            if info_type.is_empty() {
                continue;
            }
            for (idx, (revision, bucket)) in &columns {
                let cell = record.get(*idx).unwrap_or("0");
                let n: u64 = cell.parse().map_err(|_| EngineError::SnapshotCell {
                    column: headers.get(*idx).unwrap_or("").to_string(),
                    info_type: info_type.to_string(),
                    value: cell.to_string(),
                })?;
                counters.add(*revision, *bucket, info_type, n);
            }
        }

        Ok(counters)
    }
}
