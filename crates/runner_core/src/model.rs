use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier the state machine assigns to each run.
pub type RunId = u64;

/// Progress payload field naming the contract a job verifies.
pub const CONTRACT_FIELD: &str = "contract";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "PENDING"),
            JobStatus::Running => write!(f, "RUNNING"),
            JobStatus::Succeeded => write!(f, "SUCCEEDED"),
            JobStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// One poll cycle's view of a remote job. Replaced, never accumulated, per job id.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub job_id: String,
    pub status: JobStatus,
    pub ended: bool,
    pub cloud_errors: Vec<String>,
    /// Decoded verification progress; an empty object when the server sent none.
    pub progress: Value,
    pub created_at: Option<String>,
}

impl JobSnapshot {
    pub fn contract(&self) -> Option<&str> {
        self.progress.get(CONTRACT_FIELD).and_then(Value::as_str)
    }

    pub fn has_progress(&self) -> bool {
        !is_empty_payload(&self.progress)
    }
}

/// `null` and `{}` both count as "no progress yet".
pub fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Zero-based row/column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub const ORIGIN: Position = Position { row: 0, col: 0 };

    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Converts a one-based report location. Zero inputs clamp to the origin.
    pub fn from_one_based(row: u32, col: u32) -> Self {
        Self {
            row: row.saturating_sub(1),
            col: col.saturating_sub(1),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.col + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub start: Position,
    pub end: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn at(path: PathBuf, position: Position, message: impl Into<String>) -> Self {
        Self {
            path,
            start: position,
            end: position,
            message: message.into(),
        }
    }
}

/// Diagnostics grouped by resolved path, in path order.
pub type DiagnosticsByPath = BTreeMap<PathBuf, Vec<Diagnostic>>;
