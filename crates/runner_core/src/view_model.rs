use std::path::PathBuf;

use crate::model::{JobStatus, RunId};
use crate::state::RunStatus;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub runs: Vec<RunRowView>,
    pub jobs: Vec<JobRowView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRowView {
    pub run_id: RunId,
    pub config_id: String,
    pub status: RunStatus,
    pub log_path: Option<PathBuf>,
    pub active_polls: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: String,
    pub contract: Option<String>,
    pub status: JobStatus,
    pub ended: bool,
    pub created_at: Option<String>,
}
