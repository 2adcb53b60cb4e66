use std::fmt;
use std::path::PathBuf;

use runner_core::{JobSnapshot, RunId};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RunStarted {
        run_id: RunId,
        pid: Option<u32>,
        log_path: PathBuf,
    },
    SpawnFailed {
        run_id: RunId,
        message: String,
    },
    StreamFailed {
        run_id: RunId,
        message: String,
    },
    PollStarted {
        run_id: RunId,
        url: String,
    },
    Snapshot {
        run_id: RunId,
        snapshot: JobSnapshot,
        is_final: bool,
    },
    PollStopped {
        run_id: RunId,
        outcome: PollOutcome,
    },
    RunExited {
        run_id: RunId,
        code: Option<i32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Terminal success with a non-empty progress payload, delivered as final.
    Completed,
    /// Remote job failed; carries the cloud error messages.
    Failed(Vec<String>),
    /// Terminal success without any progress payload.
    EmptyResult,
    Cancelled,
    /// Transport or decode failure; polling is not retried.
    Unavailable(PollError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct PollError {
    pub kind: PollFailureKind,
    pub message: String,
}

impl PollError {
    pub(crate) fn new(kind: PollFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Network,
    Decode,
}

impl fmt::Display for PollFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollFailureKind::InvalidUrl => write!(f, "invalid url"),
            PollFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            PollFailureKind::Network => write!(f, "network error"),
            PollFailureKind::Decode => write!(f, "malformed response"),
        }
    }
}
