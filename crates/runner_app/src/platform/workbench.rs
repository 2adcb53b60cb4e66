//! Terminal stand-in for the editor: prints what an IDE would display.

use std::path::{Path, PathBuf};

use runner_core::{
    Diagnostic, DiagnosticSink, DocumentOpener, Notification, NotificationLevel, Notifier,
    Position,
};
use runner_logging::{runner_error, runner_info};

pub struct TerminalWorkbench {
    workspace: PathBuf,
    accept_actions: bool,
}

impl TerminalWorkbench {
    pub fn new(workspace: PathBuf, accept_actions: bool) -> Self {
        Self {
            workspace,
            accept_actions,
        }
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.workspace)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

impl DocumentOpener for TerminalWorkbench {
    fn open_document(&self, path: &Path, position: Position) {
        println!("--> {}:{}", path.display(), position);
    }
}

impl DiagnosticSink for TerminalWorkbench {
    fn publish(&self, set_name: &str, path: &Path, diagnostics: &[Diagnostic]) {
        runner_info!("Publishing {} diagnostics as {}", diagnostics.len(), set_name);
        let shown = self.display_path(path);
        for diagnostic in diagnostics {
            println!("{}:{}: error: {}", shown, diagnostic.start, diagnostic.message);
        }
    }

    fn clear(&self, set_name: &str, path: &Path) {
        runner_info!("Clearing diagnostics {}", set_name);
        println!("{}: diagnostics cleared", self.display_path(path));
    }
}

impl Notifier for TerminalWorkbench {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => runner_info!("{}", notification.message),
            NotificationLevel::Error => runner_error!("{}", notification.message),
        }
        let prefix = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        };
        println!("[{prefix}] {}", notification.message);

        if let Some(action) = notification.action {
            if self.accept_actions {
                self.open_document(&action.path, action.position);
            } else {
                println!("        open: {}", action.path.display());
            }
        }
    }
}
