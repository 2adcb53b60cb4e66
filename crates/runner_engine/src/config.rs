use std::path::PathBuf;
use std::time::Duration;

/// Verifier executable invoked when nothing else is configured.
pub const DEFAULT_COMMAND: &str = "certoraRun";
/// Directory under the workspace root that receives run logs.
pub const DEFAULT_LOG_DIR: &str = "certora-logs";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub command: PathBuf,
    pub workspace_root: PathBuf,
    pub log_dir_name: String,
    pub poll: PollSettings,
    pub report: ReportSettings,
}

impl EngineConfig {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            command: PathBuf::from(DEFAULT_COMMAND),
            workspace_root: workspace_root.into(),
            log_dir_name: DEFAULT_LOG_DIR.to_string(),
            poll: PollSettings::default(),
            report: ReportSettings::default(),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.workspace_root.join(&self.log_dir_name)
    }
}

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Delay between the end of one poll cycle and the start of the next.
    pub interval: Duration,
    pub connect_timeout: Duration,
    /// Attribute requested from the job-data endpoint.
    pub job_data_attr: String,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            connect_timeout: Duration::from_secs(10),
            job_data_attr: "postTime".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Accepted error report file names.
    pub file_names: Vec<String>,
    /// Directory names never searched, neither for reports nor for sources.
    pub excluded_dirs: Vec<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            file_names: vec![
                "certora_errors.json".to_string(),
                "errors.json".to_string(),
            ],
            excluded_dirs: vec![
                ".certora_internal".to_string(),
                ".certora_sources".to_string(),
                ".certora_config".to_string(),
                ".git".to_string(),
                "node_modules".to_string(),
                DEFAULT_LOG_DIR.to_string(),
            ],
        }
    }
}

impl ReportSettings {
    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.excluded_dirs.iter().any(|excluded| excluded == dir_name)
    }
}
