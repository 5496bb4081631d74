//! Report utilities: first-column dedupe and JSON query-export prep.

use std::collections::HashSet;
use std::path::Path;

use crate::{reports, CliError};

/// `dwatch dedupe` — keep the first row per first-column value.
pub fn cmd_dedupe(input: &Path, out: &Path) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(input).map_err(|e| {
        CliError::input(format!("cannot read {}: {}", input.display(), e))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(raw.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| CliError::input(format!("cannot parse {}: {}", input.display(), e)))?
        .clone();

    let mut writer = reports::create_csv(out)?;
    writer
        .write_record(&headers)
        .map_err(|e| CliError::output(format!("CSV write error: {e}")))?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut total = 0usize;
    let mut kept = 0usize;

    for record in reader.records() {
        let record =
            record.map_err(|e| CliError::input(format!("cannot parse {}: {}", input.display(), e)))?;
        total += 1;
        let key = record.get(0).unwrap_or("").to_string();
        if seen.insert(key) {
            kept += 1;
            writer
                .write_record(&record)
                .map_err(|e| CliError::output(format!("CSV write error: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| CliError::output(format!("CSV flush error: {e}")))?;

    eprintln!("deduplicated {} -> {} row(s), written to {}", total, kept, out.display());
    Ok(())
}

/// `dwatch prep` — sort a JSON array by `insertTime` ascending and strip
/// the `decomposedQueries` field from every object.
pub fn cmd_prep(input: &Path, out: &Path) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(input).map_err(|e| {
        CliError::input(format!("cannot read {}: {}", input.display(), e))
    })?;

    let mut items: Vec<serde_json::Value> = serde_json::from_str(&raw).map_err(|e| {
        CliError::input(format!("invalid JSON in {}: {}", input.display(), e))
            .with_hint("expected a top-level array of objects")
    })?;

    // Stable sort: objects without insertTime keep their relative order at
    // the front.
    items.sort_by_key(|item| item.get("insertTime").and_then(|v| v.as_i64()).unwrap_or(0));

    for item in &mut items {
        if let Some(obj) = item.as_object_mut() {
            obj.remove("decomposedQueries");
        }
    }

    let rendered = serde_json::to_string_pretty(&items)
        .map_err(|e| CliError::output(format!("cannot render JSON: {e}")))?;
    std::fs::write(out, rendered + "\n").map_err(|e| {
        CliError::output(format!("cannot write {}: {}", out.display(), e))
    })?;

    eprintln!("{} item(s) sorted and written to {}", items.len(), out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let out = dir.path().join("out.csv");
        std::fs::write(
            &input,
            "question,old_id\nq1,a\nq2,b\nq1,c\nq3,d\nq2,e\n",
        )
        .unwrap();

        cmd_dedupe(&input, &out).unwrap();

        let result = std::fs::read_to_string(&out).unwrap();
        assert_eq!(result, "question,old_id\nq1,a\nq2,b\nq3,d\n");
    }

    #[test]
    fn dedupe_missing_input_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_dedupe(&dir.path().join("absent.csv"), &dir.path().join("out.csv"))
            .unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_INPUT);
    }

    #[test]
    fn prep_sorts_and_strips() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let out = dir.path().join("out.json");
        std::fs::write(
            &input,
            r#"[
                { "query": "late", "insertTime": 300, "decomposedQueries": ["x"] },
                { "query": "early", "insertTime": 100 },
                { "query": "untimed" }
            ]"#,
        )
        .unwrap();

        cmd_prep(&input, &out).unwrap();

        let items: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(items[0]["query"], "untimed");
        assert_eq!(items[1]["query"], "early");
        assert_eq!(items[2]["query"], "late");
        assert!(items[2].get("decomposedQueries").is_none());
    }

    #[test]
    fn prep_rejects_non_array_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        std::fs::write(&input, r#"{ "not": "an array" }"#).unwrap();
        let err = cmd_prep(&input, &dir.path().join("out.json")).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_INPUT);
    }
}
