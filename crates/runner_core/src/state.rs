use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::aggregate;
use crate::model::{JobSnapshot, RunId};
use crate::view_model::{AppViewModel, JobRowView, RunRowView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Starting,
    Running,
    /// Stream failure: no longer active, but the process has not closed yet.
    Detached,
    Exited { code: Option<i32> },
}

impl RunStatus {
    pub fn is_active(self) -> bool {
        matches!(self, RunStatus::Starting | RunStatus::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEntry {
    pub config_id: String,
    pub started_ms: i64,
    pub status: RunStatus,
    pub pid: Option<u32>,
    pub log_path: Option<PathBuf>,
    pub active_polls: usize,
}

impl RunEntry {
    /// A live process can be stopped, and so can the poll loops an exited
    /// process left behind. A detached process cannot.
    pub fn is_cancellable(&self) -> bool {
        match self.status {
            RunStatus::Starting | RunStatus::Running => true,
            RunStatus::Exited { .. } => self.active_polls > 0,
            RunStatus::Detached => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    runs: BTreeMap<RunId, RunEntry>,
    jobs: Vec<JobSnapshot>,
    next_run_id: RunId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            runs: self
                .runs
                .iter()
                .map(|(run_id, run)| RunRowView {
                    run_id: *run_id,
                    config_id: run.config_id.clone(),
                    status: run.status,
                    log_path: run.log_path.clone(),
                    active_polls: run.active_polls,
                })
                .collect(),
            jobs: self
                .jobs
                .iter()
                .map(|job| JobRowView {
                    job_id: job.job_id.clone(),
                    contract: job.contract().map(str::to_string),
                    status: job.status,
                    ended: job.ended,
                    created_at: job.created_at.clone(),
                })
                .collect(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn run(&self, run_id: RunId) -> Option<&RunEntry> {
        self.runs.get(&run_id)
    }

    pub fn jobs(&self) -> &[JobSnapshot] {
        &self.jobs
    }

    /// Every run has closed and no poll loop is still going.
    pub fn is_settled(&self) -> bool {
        self.runs
            .values()
            .all(|run| matches!(run.status, RunStatus::Exited { .. }) && run.active_polls == 0)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn register_run(&mut self, config_id: String, started_ms: i64) -> RunId {
        self.next_run_id += 1;
        let run_id = self.next_run_id;
        self.runs.insert(
            run_id,
            RunEntry {
                config_id,
                started_ms,
                status: RunStatus::Starting,
                pid: None,
                log_path: None,
                active_polls: 0,
            },
        );
        self.mark_dirty();
        run_id
    }

    pub(crate) fn run_mut(&mut self, run_id: RunId) -> Option<&mut RunEntry> {
        self.dirty = true;
        self.runs.get_mut(&run_id)
    }

    pub(crate) fn remove_run(&mut self, run_id: RunId) -> Option<RunEntry> {
        self.mark_dirty();
        self.runs.remove(&run_id)
    }

    pub(crate) fn merge_snapshot(&mut self, snapshot: JobSnapshot) {
        aggregate::merge(&mut self.jobs, snapshot);
        self.mark_dirty();
    }
}
