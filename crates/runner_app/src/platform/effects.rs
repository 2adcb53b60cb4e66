use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use runner_core::{
    DiagnosticPublisher, Effect, ErrorReportParser, FileEvent, FileEventKind, Msg,
    NotificationLevel, Notifier, PollEnd,
};
use runner_engine::{
    collect_error_report, EngineConfig, EngineEvent, EngineHandle, PollOutcome, ReportSettings,
    WorkspacePathResolver,
};
use runner_logging::{runner_debug, runner_info, runner_trace};

use super::workbench::TerminalWorkbench;

pub struct EffectRunner {
    engine: EngineHandle,
    workbench: Arc<TerminalWorkbench>,
    publisher: DiagnosticPublisher<Arc<TerminalWorkbench>>,
    parser: ErrorReportParser,
    resolver: WorkspacePathResolver,
    workspace: PathBuf,
    report: ReportSettings,
    /// Modification time of each published file at the moment it was published.
    published_at: HashMap<PathBuf, Option<SystemTime>>,
    errors: usize,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, workbench: Arc<TerminalWorkbench>) -> Self {
        let workspace = config.workspace_root.clone();
        let report = config.report.clone();
        let resolver = WorkspacePathResolver::new(workspace.clone(), report.clone());
        Self {
            engine: EngineHandle::new(config),
            publisher: DiagnosticPublisher::new(workbench.clone()),
            workbench,
            parser: ErrorReportParser::default(),
            resolver,
            workspace,
            report,
            published_at: HashMap::new(),
            errors: 0,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ResetDiagnostics => {
                    self.publisher.reset();
                    self.published_at.clear();
                }
                Effect::SpawnRun {
                    run_id,
                    config_id,
                    started_ms,
                } => {
                    runner_info!("SpawnRun run_id={} config={}", run_id, config_id);
                    self.engine.spawn(run_id, config_id, started_ms);
                }
                Effect::CancelRun { run_id } => {
                    runner_info!("CancelRun run_id={}", run_id);
                    self.engine.cancel(run_id);
                }
                Effect::LoadErrorReport { run_id, log_path } => {
                    let report = collect_error_report(&self.workspace, &self.report);
                    let diagnostics = self.parser.parse(&report, &self.resolver, &log_path);
                    let paths: Vec<PathBuf> = diagnostics.keys().cloned().collect();
                    self.publisher.publish(diagnostics);
                    for path in paths {
                        if self.publisher.diagnostics_for(&path).is_some() {
                            let at_publish = modified(&path);
                            self.published_at.insert(path, at_publish);
                        }
                    }
                    runner_info!(
                        "Run {} published diagnostics, {} file(s) now carry some",
                        run_id,
                        self.publisher.paths().count()
                    );
                }
                Effect::Notify(notification) => {
                    if notification.level == NotificationLevel::Error {
                        self.errors += 1;
                    }
                    self.workbench.notify(notification);
                }
            }
        }
    }

    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    /// Clears the diagnostics of an edited file. A change notification that
    /// leaves the file as it was when published is a write from before the
    /// publish, delivered late, and is ignored.
    pub fn on_file_event(&mut self, event: &FileEvent) {
        if event.kind == FileEventKind::Changed {
            if let Some(Some(at_publish)) = self.published_at.get(&event.path) {
                if modified(&event.path) == Some(*at_publish) {
                    runner_trace!("Ignoring earlier write to {:?}", event.path);
                    return;
                }
            }
        }
        if self.publisher.on_file_event(event) {
            self.published_at.remove(&event.path);
            runner_debug!("Diagnostics for {:?} went stale", event.path);
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Whether any published diagnostics still wait for an edit.
    pub fn is_watching(&self) -> bool {
        self.publisher.is_watching()
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::RunStarted {
            run_id,
            pid,
            log_path,
        } => Msg::RunStarted {
            run_id,
            pid,
            log_path,
        },
        EngineEvent::SpawnFailed { run_id, message } => Msg::SpawnFailed { run_id, message },
        EngineEvent::StreamFailed { run_id, message } => Msg::StreamFailed { run_id, message },
        EngineEvent::PollStarted { run_id, url } => Msg::PollStarted { run_id, url },
        EngineEvent::Snapshot {
            run_id,
            snapshot,
            is_final,
        } => Msg::SnapshotReceived {
            run_id,
            snapshot,
            is_final,
        },
        EngineEvent::PollStopped { run_id, outcome } => Msg::PollStopped {
            run_id,
            outcome: map_outcome(outcome),
        },
        EngineEvent::RunExited { run_id, code } => Msg::RunExited { run_id, code },
    }
}

fn map_outcome(outcome: PollOutcome) -> PollEnd {
    match outcome {
        PollOutcome::Completed => PollEnd::Completed,
        PollOutcome::Failed(messages) => PollEnd::Failed { messages },
        PollOutcome::EmptyResult => PollEnd::EmptyResult,
        PollOutcome::Cancelled => PollEnd::Cancelled,
        PollOutcome::Unavailable(err) => PollEnd::Unavailable {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner_engine::{PollError, PollFailureKind};
    use tempfile::TempDir;

    const REPORT: &str =
        r#"{"topics":[{"name":"solc","messages":[{"message":"Missing.sol:3:1: boom"}]}]}"#;

    /// Workspace with a run log and a report whose only file cannot be found,
    /// so the diagnostic lands on the log.
    fn failed_run_workspace() -> (TempDir, PathBuf, EffectRunner) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("certora-logs")).unwrap();
        let log = root.join("certora-logs").join("B.conf-1.log");
        fs::write(&log, "compiling\n").unwrap();
        fs::write(root.join("certora_errors.json"), REPORT).unwrap();

        let workbench = Arc::new(TerminalWorkbench::new(root.clone(), false));
        let runner = EffectRunner::new(EngineConfig::new(&root), workbench);
        (temp, log, runner)
    }

    #[test]
    fn late_event_for_earlier_write_keeps_diagnostics() {
        let (_temp, log, mut runner) = failed_run_workspace();
        runner.run(vec![Effect::LoadErrorReport {
            run_id: 1,
            log_path: log.clone(),
        }]);
        assert!(runner.is_watching());

        runner.on_file_event(&FileEvent::changed(log.clone()));
        assert!(runner.is_watching());

        let file = fs::OpenOptions::new().append(true).open(&log).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();
        runner.on_file_event(&FileEvent::changed(log.clone()));
        assert!(!runner.is_watching());
    }

    #[test]
    fn removal_clears_diagnostics_at_once() {
        let (_temp, log, mut runner) = failed_run_workspace();
        runner.run(vec![Effect::LoadErrorReport {
            run_id: 1,
            log_path: log.clone(),
        }]);

        runner.on_file_event(&FileEvent::removed(log));
        assert!(!runner.is_watching());
    }

    #[test]
    fn reset_forgets_published_files() {
        let (_temp, log, mut runner) = failed_run_workspace();
        runner.run(vec![Effect::LoadErrorReport {
            run_id: 1,
            log_path: log,
        }]);
        runner.run(vec![Effect::ResetDiagnostics]);
        assert!(!runner.is_watching());
        assert!(runner.published_at.is_empty());
    }

    #[test]
    fn unavailable_outcome_keeps_error_text() {
        let err = PollError {
            kind: PollFailureKind::HttpStatus(502),
            message: "502 Bad Gateway".to_string(),
        };
        assert_eq!(
            map_outcome(PollOutcome::Unavailable(err)),
            PollEnd::Unavailable {
                message: "http status 502: 502 Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn failed_outcome_keeps_messages() {
        assert_eq!(
            map_outcome(PollOutcome::Failed(vec!["a".to_string()])),
            PollEnd::Failed {
                messages: vec!["a".to_string()]
            }
        );
    }
}
