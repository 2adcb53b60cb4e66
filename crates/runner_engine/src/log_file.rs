use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("log directory missing or not writable: {0}")]
    LogDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Append-only capture of one run's standard output.
///
/// The file is opened, appended and closed on every write so that everything
/// written so far survives a crash of either process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Creates `<dir>/<basename(config_id)>-<started_ms>.log`, empty.
    pub fn create(dir: &Path, config_id: &str, started_ms: i64) -> Result<Self, LogError> {
        ensure_log_dir(dir)?;
        let path = dir.join(log_file_name(config_id, started_ms));
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, text: &str) -> Result<(), LogError> {
        if text.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

pub fn log_file_name(config_id: &str, started_ms: i64) -> String {
    let base = Path::new(config_id)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| config_id.to_string());
    format!("{base}-{started_ms}.log")
}

/// Ensure log directory exists; create if missing.
fn ensure_log_dir(dir: &Path) -> Result<(), LogError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| LogError::LogDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(LogError::LogDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| LogError::LogDir(e.to_string()))?;
    }
    Ok(())
}
