//! Primitives the surrounding editor/UI provides to the runner.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::model::{Diagnostic, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Document the user may choose to open from a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDocument {
    pub path: PathBuf,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub action: Option<OpenDocument>,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn with_action(mut self, path: PathBuf, position: Position) -> Self {
        self.action = Some(OpenDocument { path, position });
        self
    }

    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            action: None,
        }
    }
}

pub trait DocumentOpener: Send + Sync {
    fn open_document(&self, path: &Path, position: Position);
}

/// Named diagnostic sets; the name identifies the set across publish/clear.
pub trait DiagnosticSink: Send + Sync {
    fn publish(&self, set_name: &str, path: &Path, diagnostics: &[Diagnostic]);
    fn clear(&self, set_name: &str, path: &Path);
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Arc<T> {
    fn publish(&self, set_name: &str, path: &Path, diagnostics: &[Diagnostic]) {
        (**self).publish(set_name, path, diagnostics);
    }

    fn clear(&self, set_name: &str, path: &Path) {
        (**self).clear(set_name, path);
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

impl<T: DocumentOpener + ?Sized> DocumentOpener for Arc<T> {
    fn open_document(&self, path: &Path, position: Position) {
        (**self).open_document(path, position);
    }
}
