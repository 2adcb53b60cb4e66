use std::path::PathBuf;

use crate::collab::Notification;
use crate::model::RunId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Clear and dispose every live diagnostic set.
    ResetDiagnostics,
    SpawnRun {
        run_id: RunId,
        config_id: String,
        started_ms: i64,
    },
    CancelRun { run_id: RunId },
    /// Locate and parse the error report of a failed run, then publish it.
    LoadErrorReport { run_id: RunId, log_path: PathBuf },
    Notify(Notification),
}
