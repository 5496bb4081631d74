// DriftWatch CLI - consistency and compliance harness for a search backend
// migrating between two API revisions.

mod audit;
mod cache;
mod category;
mod compare;
mod config;
mod exit_codes;
mod pool;
mod prep;
mod reports;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_INPUT, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "dwatch")]
#[command(about = "Consistency and compliance harness for search API revisions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff ranked result ids between the two revisions per query
    #[command(after_help = "\
Samples each revision several times and reports the least-different pairing,
so backend non-determinism does not show up as divergence.

Examples:
  dwatch compare queries.csv --config harness.toml --out id_diff_report.csv
  dwatch compare queries.csv --config harness.toml --out diff.csv --samples 5")]
    Compare {
        /// Query file, one query per line
        queries: PathBuf,

        /// Harness config (endpoints, request params, probe knobs)
        #[arg(long)]
        config: PathBuf,

        /// Output CSV of diff rows
        #[arg(long)]
        out: PathBuf,

        /// Samples per revision per query (overrides config)
        #[arg(long)]
        samples: Option<usize>,
    },

    /// Validate per-record field compliance and accumulate coverage counters
    #[command(after_help = "\
Probes both revisions once per query. Non-compliant records become rows in
the validation report; coverage counters (per information type, cache
bucket, and revision) are reloaded at start and rewritten after every query,
so an interrupted run can resume where the counters left off.

Examples:
  dwatch audit queries.csv --config harness.toml \\
      --out validation_results.csv --coverage coverage_results.csv")]
    Audit {
        /// Query file, one query per line
        queries: PathBuf,

        /// Harness config (endpoints, request params, probe knobs)
        #[arg(long)]
        config: PathBuf,

        /// Output CSV of violation rows (rewritten each run)
        #[arg(long)]
        out: PathBuf,

        /// Coverage counters CSV (reloaded, then rewritten per query)
        #[arg(long)]
        coverage: PathBuf,
    },

    /// Record cache status per query across a worker pool
    #[command(after_help = "\
Examples:
  dwatch cache queries.csv --config harness.toml --out cache_report.csv
  dwatch cache queries.csv --config harness.toml --out cache.csv --workers 5")]
    Cache {
        /// Query file, one query per line
        queries: PathBuf,

        /// Harness config (endpoints, request params, probe knobs)
        #[arg(long)]
        config: PathBuf,

        /// Output CSV, appended so reruns extend one report
        #[arg(long)]
        out: PathBuf,

        /// Worker pool width (overrides config)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Request each information type explicitly and record steering misses
    #[command(after_help = "\
Examples:
  dwatch category queries.csv --config harness.toml --out mismatch_records.csv")]
    Category {
        /// Query file, one query per line
        queries: PathBuf,

        /// Harness config (endpoints, request params, probe knobs)
        #[arg(long)]
        config: PathBuf,

        /// Output CSV of mismatch and empty-response rows
        #[arg(long)]
        out: PathBuf,
    },

    /// Drop rows whose first-column value was already seen
    #[command(after_help = "\
Examples:
  dwatch dedupe id_diff_report.csv --out retry_queries.csv")]
    Dedupe {
        /// Input CSV with a header row
        input: PathBuf,

        /// Deduplicated output CSV
        #[arg(long)]
        out: PathBuf,
    },

    /// Sort a JSON query export by insertTime and strip decomposedQueries
    #[command(after_help = "\
Examples:
  dwatch prep modelV2CoreQuery.json --out queries_sorted.json")]
    Prep {
        /// Input JSON array
        input: PathBuf,

        /// Processed output JSON
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Compare { queries, config, out, samples } => {
            compare::cmd_compare(&queries, &config, &out, samples)
        }
        Commands::Audit { queries, config, out, coverage } => {
            audit::cmd_audit(&queries, &config, &out, &coverage)
        }
        Commands::Cache { queries, config, out, workers } => {
            cache::cmd_cache(&queries, &config, &out, workers)
        }
        Commands::Category { queries, config, out } => {
            category::cmd_category(&queries, &config, &out)
        }
        Commands::Dedupe { input, out } => prep::cmd_dedupe(&input, &out),
        Commands::Prep { input, out } => prep::cmd_prep(&input, &out),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Read the query corpus: one query per line, trimmed, blanks skipped.
pub(crate) fn read_queries(path: &Path) -> Result<Vec<String>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CliError::input(format!("cannot read query file {}: {}", path.display(), e))
            .with_hint("create a file with one query per line")
    })?;

    let queries: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if queries.is_empty() {
        return Err(CliError::input(format!(
            "query file {} contains no queries",
            path.display()
        )));
    }

    Ok(queries)
}
