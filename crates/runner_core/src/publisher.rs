//! Registry of live diagnostic sets, one generation at a time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::collab::DiagnosticSink;
use crate::model::{Diagnostic, DiagnosticsByPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Changed,
    Created,
    Removed,
    Renamed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
}

impl FileEvent {
    pub fn changed(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: FileEventKind::Changed,
            path: path.into(),
        }
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: FileEventKind::Removed,
            path: path.into(),
        }
    }

    /// Creation leaves no stale diagnostics behind, everything else does.
    fn invalidates(&self) -> bool {
        !matches!(self.kind, FileEventKind::Created)
    }
}

/// Owns the active diagnostic sets and decides when they go stale.
///
/// A path stays pending from the moment its set is published until the first
/// invalidating file event on it. The file watcher is only needed while at
/// least one path is pending.
pub struct DiagnosticPublisher<S: DiagnosticSink> {
    sink: S,
    sets: BTreeMap<PathBuf, Vec<Diagnostic>>,
}

impl<S: DiagnosticSink> DiagnosticPublisher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            sets: BTreeMap::new(),
        }
    }

    /// Name under which the set for `path` is published.
    pub fn set_name(path: &Path) -> String {
        path.display().to_string()
    }

    /// Clears every live set. Called at the start of each run.
    pub fn reset(&mut self) {
        for path in std::mem::take(&mut self.sets).into_keys() {
            self.sink.clear(&Self::set_name(&path), &path);
        }
    }

    /// Publishes one set per path. A path that already has a set is replaced.
    pub fn publish(&mut self, diagnostics: DiagnosticsByPath) {
        for (path, items) in diagnostics {
            if items.is_empty() {
                continue;
            }
            self.sink.publish(&Self::set_name(&path), &path, &items);
            self.sets.insert(path, items);
        }
    }

    /// Clears the set for the event's path, if any. Returns whether a set was cleared.
    pub fn on_file_event(&mut self, event: &FileEvent) -> bool {
        if !event.invalidates() {
            return false;
        }
        if self.sets.remove(&event.path).is_none() {
            return false;
        }
        self.sink.clear(&Self::set_name(&event.path), &event.path);
        true
    }

    pub fn is_watching(&self) -> bool {
        !self.sets.is_empty()
    }

    pub fn diagnostics_for(&self, path: &Path) -> Option<&[Diagnostic]> {
        self.sets.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.sets.keys().map(PathBuf::as_path)
    }
}
