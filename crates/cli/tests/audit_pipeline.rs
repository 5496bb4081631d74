// Integration tests for `dwatch audit`: validation rows, cache-bucketed
// coverage, and resume-from-snapshot accumulation.
// Run with: cargo test -p driftwatch-cli --test audit_pipeline

use std::path::Path;
use std::process::Command;

use httpmock::prelude::*;

fn dwatch() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dwatch"))
}

fn write_config(dir: &Path, old_url: &str, new_url: &str) -> std::path::PathBuf {
    let path = dir.join("harness.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[endpoints]
old = "{old_url}"
new = "{new_url}"

[probe]
backoff_ms = 1
probe_gap_ms = 0
query_gap_ms = 0
max_attempts = 2
"#
        ),
    )
    .unwrap();
    path
}

fn run_audit(queries: &Path, config: &Path, out: &Path, coverage: &Path) -> std::process::Output {
    dwatch()
        .args([
            "audit",
            queries.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--coverage",
            coverage.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run dwatch")
}

/// Old revision: cache hit, one compliant NEWS record and one NEWS record
/// with an empty source and a REPORT-prefixed id. New revision: no cache
/// info, one compliant CFH record.
fn mock_endpoints(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST).path("/old");
        then.status(200).json_body(serde_json::json!({
            "data": [
                {
                    "id": "NW1", "title": "ok", "showTime": "2026-08-06 09:00:00",
                    "informationType": "NEWS", "source": "wire"
                },
                {
                    "id": "AP2", "title": "bad", "showTime": "2026-08-06 09:00:00",
                    "informationType": "NEWS", "source": null
                }
            ],
            "extraInfos": { "isCache": true, "cacheTraceId": "ct-1" },
            "traceId": "old-1"
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/new");
        then.status(200).json_body(serde_json::json!({
            "data": [
                {
                    "id": "778899", "title": "fine", "showTime": "2026-08-06 09:00:00",
                    "informationType": "CFH", "source": "desk"
                }
            ],
            "traceId": "new-1"
        }));
    });
}

#[test]
fn violations_and_coverage_from_one_run() {
    let server = MockServer::start();
    mock_endpoints(&server);

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.url("/old"), &server.url("/new"));
    let queries = dir.path().join("queries.csv");
    std::fs::write(&queries, "some query\n").unwrap();
    let out = dir.path().join("validation.csv");
    let coverage = dir.path().join("coverage.csv");

    let output = run_audit(&queries, &config, &out, &coverage);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );

    // Exactly one violation row: the AP-prefixed NEWS record with no source.
    let report = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2, "header + one violation:\n{report}");
    assert!(lines[0].starts_with("endpoint,id,title"));
    assert!(lines[1].starts_with("old,AP2,bad"));
    assert!(lines[1].contains("source is empty (null or '') but NEWS requires it"));
    assert!(lines[1].contains("id prefix should be NW but found: AP"));
    assert!(lines[1].contains("true"), "cache flag present+true: {}", lines[1]);

    // Coverage: two NEWS under old/cache_hit, one CFH under new/no_cache_info.
    let snapshot = std::fs::read_to_string(&coverage).unwrap();
    let lines: Vec<&str> = snapshot.lines().collect();
    assert_eq!(
        lines[0],
        "information_type,count_old_cache_hit,count_old_cache_miss,count_old_no_cache_info,\
         count_new_cache_hit,count_new_cache_miss,count_new_no_cache_info"
    );
    assert!(lines.contains(&"CFH,0,0,0,0,0,1"), "snapshot:\n{snapshot}");
    assert!(lines.contains(&"NEWS,2,0,0,0,0,0"), "snapshot:\n{snapshot}");
}

#[test]
fn rerunning_with_a_snapshot_doubles_the_counters() {
    let server = MockServer::start();
    mock_endpoints(&server);

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.url("/old"), &server.url("/new"));
    let queries = dir.path().join("queries.csv");
    std::fs::write(&queries, "some query\n").unwrap();
    let out = dir.path().join("validation.csv");
    let coverage = dir.path().join("coverage.csv");

    assert_eq!(run_audit(&queries, &config, &out, &coverage).status.code(), Some(0));
    assert_eq!(run_audit(&queries, &config, &out, &coverage).status.code(), Some(0));

    // At-least-once accumulation: identical input replayed over a snapshot
    // double-counts.
    let snapshot = std::fs::read_to_string(&coverage).unwrap();
    let lines: Vec<&str> = snapshot.lines().collect();
    assert!(lines.contains(&"CFH,0,0,0,0,0,2"), "snapshot:\n{snapshot}");
    assert!(lines.contains(&"NEWS,4,0,0,0,0,0"), "snapshot:\n{snapshot}");

    // The validation report is rewritten, not appended.
    let report = std::fs::read_to_string(&out).unwrap();
    assert_eq!(report.lines().count(), 2, "report:\n{report}");
}

#[test]
fn structural_data_error_becomes_a_dedicated_row() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/old");
        then.status(200).json_body(serde_json::json!({
            "data": [],
            "extraInfos": { "isCache": false },
            "traceId": "old-1"
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/new");
        then.status(200).json_body(serde_json::json!({
            "data": { "unexpected": "object" },
            "traceId": "new-1"
        }));
    });

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.url("/old"), &server.url("/new"));
    let queries = dir.path().join("queries.csv");
    std::fs::write(&queries, "some query\n").unwrap();
    let out = dir.path().join("validation.csv");
    let coverage = dir.path().join("coverage.csv");

    let output = run_audit(&queries, &config, &out, &coverage);
    assert_eq!(output.status.code(), Some(0));

    let report = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2, "header + structural row:\n{report}");
    assert!(lines[1].starts_with("new,ERROR,ERROR"));
    assert!(lines[1].contains("response 'data' field is not a list"));
}

#[test]
fn unreachable_endpoint_is_recorded_not_fatal() {
    let server = MockServer::start();
    // Only the new revision answers; the old one returns 500 until the
    // bounded audit policy gives up.
    server.mock(|when, then| {
        when.method(POST).path("/old");
        then.status(500).body("boom");
    });
    server.mock(|when, then| {
        when.method(POST).path("/new");
        then.status(200).json_body(serde_json::json!({
            "data": [], "traceId": "new-1"
        }));
    });

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.url("/old"), &server.url("/new"));
    let queries = dir.path().join("queries.csv");
    std::fs::write(&queries, "some query\n").unwrap();
    let out = dir.path().join("validation.csv");
    let coverage = dir.path().join("coverage.csv");

    let output = run_audit(&queries, &config, &out, &coverage);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );

    let report = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2, "header + request-failure row:\n{report}");
    assert!(lines[1].starts_with("old,ERROR,ERROR"));
    assert!(lines[1].contains("request failed"));
}
