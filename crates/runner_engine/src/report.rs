//! Locating and reading the verifier's error report, and resolving the file
//! references inside it against the workspace.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use runner_core::{ErrorReport, PathResolver};
use runner_logging::{runner_debug, runner_warn};
use walkdir::{DirEntry, WalkDir};

use crate::ReportSettings;

fn is_excluded(entry: &DirEntry, settings: &ReportSettings) -> bool {
    // The root itself is never excluded, whatever its name.
    entry.depth() > 0
        && entry.file_type().is_dir()
        && settings.is_excluded(&entry.file_name().to_string_lossy())
}

fn workspace_files<'a>(
    root: &Path,
    settings: &'a ReportSettings,
) -> impl Iterator<Item = DirEntry> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(move |entry| !is_excluded(entry, settings))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
}

/// Finds the error report under `root`. When several candidates exist the most
/// recently modified one wins.
pub fn find_error_report(root: &Path, settings: &ReportSettings) -> Option<PathBuf> {
    workspace_files(root, settings)
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            settings.file_names.iter().any(|accepted| *accepted == name)
        })
        .map(|entry| {
            let modified = entry
                .metadata()
                .ok()
                .and_then(|meta| meta.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, entry.into_path())
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, path)| path)
}

/// Reads a report. Unreadable or malformed files yield an empty report.
pub fn load_error_report(path: &Path) -> ErrorReport {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            runner_warn!("Failed to read error report {:?}: {}", path, err);
            return ErrorReport::default();
        }
    };
    match ErrorReport::from_json(&text) {
        Ok(report) => report,
        Err(err) => {
            runner_warn!("Failed to parse error report {:?}: {}", path, err);
            ErrorReport::default()
        }
    }
}

/// Finds and loads the report for a failed run; no report means an empty one.
pub fn collect_error_report(root: &Path, settings: &ReportSettings) -> ErrorReport {
    match find_error_report(root, settings) {
        Some(path) => {
            runner_debug!("Using error report {:?}", path);
            load_error_report(&path)
        }
        None => {
            runner_debug!("No error report found under {:?}", root);
            ErrorReport::default()
        }
    }
}

/// Resolves message paths that are absolute, workspace-relative, or only
/// identifiable by file name somewhere in the workspace.
#[derive(Debug, Clone)]
pub struct WorkspacePathResolver {
    root: PathBuf,
    settings: ReportSettings,
}

impl WorkspacePathResolver {
    pub fn new(root: impl Into<PathBuf>, settings: ReportSettings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }

    fn search_by_name(&self, raw: &Path) -> Option<PathBuf> {
        let name = raw.file_name()?;
        let mut fallback = None;
        for entry in workspace_files(&self.root, &self.settings) {
            if entry.file_name() != name {
                continue;
            }
            // Prefer a file whose trailing components match the whole reference.
            if entry.path().ends_with(raw) {
                return Some(entry.into_path());
            }
            if fallback.is_none() {
                fallback = Some(entry.into_path());
            }
        }
        fallback
    }
}

impl PathResolver for WorkspacePathResolver {
    fn resolve(&self, raw: &str) -> Option<PathBuf> {
        let normalized = raw.replace('\\', "/");
        let candidate = Path::new(&normalized);
        if candidate.is_absolute() {
            if candidate.is_file() {
                return Some(candidate.to_path_buf());
            }
        } else {
            let joined = self.root.join(candidate);
            if joined.is_file() {
                return Some(joined);
            }
        }
        self.search_by_name(candidate)
    }
}
