use crate::collab::Notification;
use crate::model::Position;
use crate::msg::PollEnd;
use crate::state::RunStatus;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RunRequested {
            config_id,
            started_ms,
        } => {
            let run_id = state.register_run(config_id.clone(), started_ms);
            vec![
                Effect::ResetDiagnostics,
                Effect::SpawnRun {
                    run_id,
                    config_id,
                    started_ms,
                },
            ]
        }
        Msg::CancelRequested { run_id } => match state.run(run_id) {
            Some(run) if run.is_cancellable() => vec![Effect::CancelRun { run_id }],
            _ => Vec::new(),
        },
        Msg::RunStarted {
            run_id,
            pid,
            log_path,
        } => {
            if let Some(run) = state.run_mut(run_id) {
                // A stream failure may already have detached the run.
                if run.status == RunStatus::Starting {
                    run.status = RunStatus::Running;
                }
                run.pid = pid;
                run.log_path = Some(log_path);
            }
            Vec::new()
        }
        Msg::SpawnFailed { run_id, message } => {
            let config = state
                .remove_run(run_id)
                .map(|run| run.config_id)
                .unwrap_or_default();
            vec![Effect::Notify(Notification::error(format!(
                "Failed to start verification of {config}: {message}"
            )))]
        }
        Msg::StreamFailed { run_id, message } => {
            if let Some(run) = state.run_mut(run_id) {
                if run.status.is_active() {
                    run.status = RunStatus::Detached;
                }
            }
            vec![Effect::Notify(Notification::error(message))]
        }
        Msg::PollStarted { run_id, .. } => {
            if let Some(run) = state.run_mut(run_id) {
                run.active_polls += 1;
            }
            Vec::new()
        }
        Msg::SnapshotReceived { snapshot, .. } => {
            state.merge_snapshot(snapshot);
            Vec::new()
        }
        Msg::PollStopped { run_id, outcome } => {
            let log_path = state.run_mut(run_id).and_then(|run| {
                run.active_polls = run.active_polls.saturating_sub(1);
                run.log_path.clone()
            });
            match outcome {
                PollEnd::Failed { messages } => {
                    let mut effects = Vec::with_capacity(2);
                    if let Some(log_path) = log_path {
                        effects.push(Effect::LoadErrorReport { run_id, log_path });
                    }
                    effects.push(Effect::Notify(Notification::error(messages.join("\n"))));
                    effects
                }
                PollEnd::EmptyResult => vec![Effect::Notify(Notification::error(
                    "Verification completed with empty output",
                ))],
                PollEnd::Unavailable { message } => vec![Effect::Notify(Notification::error(
                    format!("Lost track of the verification job: {message}"),
                ))],
                PollEnd::Completed | PollEnd::Cancelled => Vec::new(),
            }
        }
        Msg::RunExited { run_id, code } => {
            let Some(run) = state.run_mut(run_id) else {
                return (state, Vec::new());
            };
            run.status = RunStatus::Exited { code };
            let config = run.config_id.clone();
            let Some(log_path) = run.log_path.clone() else {
                return (state, Vec::new());
            };

            let mut effects = Vec::with_capacity(2);
            if code != Some(0) {
                effects.push(Effect::LoadErrorReport {
                    run_id,
                    log_path: log_path.clone(),
                });
            }
            let summary = match code {
                Some(0) => format!("Verification of {config} finished."),
                Some(code) => format!("Verification of {config} exited with code {code}."),
                None => format!("Verification of {config} was terminated."),
            };
            effects.push(Effect::Notify(
                Notification::info(summary).with_action(log_path, Position::ORIGIN),
            ));
            effects
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
