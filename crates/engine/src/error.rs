use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// Snapshot header row is missing or malformed.
    SnapshotHeader(String),
    /// A snapshot cell failed to parse as a count.
    SnapshotCell { column: String, info_type: String, value: String },
    /// CSV-level read/write error.
    Csv(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SnapshotHeader(msg) => write!(f, "snapshot header error: {msg}"),
            Self::SnapshotCell { column, info_type, value } => {
                write!(f, "snapshot cell '{column}' for '{info_type}': cannot parse count '{value}'")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
