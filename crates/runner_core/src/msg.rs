use std::path::PathBuf;

use crate::model::{JobSnapshot, RunId};

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEnd {
    Completed,
    Failed { messages: Vec<String> },
    EmptyResult,
    Cancelled,
    Unavailable { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked to verify a config file.
    RunRequested { config_id: String, started_ms: i64 },
    /// User asked to stop a run.
    CancelRequested { run_id: RunId },
    /// The verifier process is up and its log file is open.
    RunStarted {
        run_id: RunId,
        pid: Option<u32>,
        log_path: PathBuf,
    },
    /// The verifier process could not be launched.
    SpawnFailed { run_id: RunId, message: String },
    /// The process wrote to stderr or reported an error event.
    StreamFailed { run_id: RunId, message: String },
    /// A progress URL was found and a poll loop started on it.
    PollStarted { run_id: RunId, url: String },
    /// A poll cycle delivered a snapshot.
    SnapshotReceived {
        run_id: RunId,
        snapshot: JobSnapshot,
        is_final: bool,
    },
    /// A poll loop stopped for good.
    PollStopped { run_id: RunId, outcome: PollEnd },
    /// The verifier process closed.
    RunExited { run_id: RunId, code: Option<i32> },
    /// UI/render tick to coalesce rendering.
    Tick,
}
