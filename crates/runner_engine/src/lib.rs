//! Runner engine: process supervision, run logs, remote status polling and
//! error report discovery.
mod config;
mod engine;
mod log_file;
mod poll;
mod report;
mod supervisor;
mod types;

pub use config::{EngineConfig, PollSettings, ReportSettings, DEFAULT_COMMAND, DEFAULT_LOG_DIR};
pub use engine::EngineHandle;
pub use log_file::{log_file_name, LogError, RunLog};
pub use poll::{
    poll_job, ChannelSnapshotSink, JobData, ReqwestStatusClient, SnapshotSink, StatusClient,
    StatusEnvelope,
};
pub use report::{
    collect_error_report, find_error_report, load_error_report, WorkspacePathResolver,
};
pub use supervisor::RunRequest;
pub use types::{EngineEvent, PollError, PollFailureKind, PollOutcome};
