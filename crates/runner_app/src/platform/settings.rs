use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use runner_engine::{EngineConfig, PollSettings, ReportSettings, DEFAULT_COMMAND, DEFAULT_LOG_DIR};
use runner_logging::{runner_info, runner_warn};
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILENAME: &str = ".prover_runner.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub command: PathBuf,
    pub log_dir: String,
    pub poll_interval_ms: u64,
    pub report_file_names: Vec<String>,
    pub excluded_dirs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let poll = PollSettings::default();
        let report = ReportSettings::default();
        Self {
            command: PathBuf::from(DEFAULT_COMMAND),
            log_dir: DEFAULT_LOG_DIR.to_string(),
            poll_interval_ms: poll.interval.as_millis() as u64,
            report_file_names: report.file_names,
            excluded_dirs: report.excluded_dirs,
        }
    }
}

impl Settings {
    pub fn engine_config(&self, workspace_root: &Path) -> EngineConfig {
        let mut config = EngineConfig::new(workspace_root);
        config.command = self.command.clone();
        config.log_dir_name = self.log_dir.clone();
        config.poll.interval = Duration::from_millis(self.poll_interval_ms);
        config.report = ReportSettings {
            file_names: self.report_file_names.clone(),
            excluded_dirs: self.excluded_dirs.clone(),
        };
        config
    }
}

/// Loads settings from `path`. A missing file yields defaults silently, an
/// unreadable or malformed one yields defaults with a warning.
pub fn load_settings(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Settings::default();
        }
        Err(err) => {
            runner_warn!("Failed to read settings from {:?}: {}", path, err);
            return Settings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            runner_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            runner_warn!("Failed to parse settings from {:?}: {}", path, err);
            Settings::default()
        }
    }
}
