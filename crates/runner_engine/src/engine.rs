use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use runner_core::RunId;
use runner_logging::{runner_error, runner_info};

use crate::poll::{ReqwestStatusClient, StatusClient};
use crate::supervisor::{supervise, ActiveRuns, RunContext, RunRequest};
use crate::{EngineConfig, EngineEvent};

enum EngineCommand {
    Spawn(RunRequest),
    Cancel { run_id: RunId },
}

/// Owns the background runtime that supervises runs and polls their jobs.
///
/// Commands go in over a channel and every observable change comes back as an
/// [`EngineEvent`]. Dropping the handle stops accepting commands; runs already
/// in flight are killed when the runtime shuts down.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let client = Arc::new(ReqwestStatusClient::new(config.poll.clone()));
        Self::with_client(config, client)
    }

    pub fn with_client(config: EngineConfig, client: Arc<dyn StatusClient>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let ctx = RunContext {
            config: Arc::new(config),
            client,
            events: event_tx,
            active: ActiveRuns::default(),
        };

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    runner_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &ctx, command);
            }
            runner_info!("Engine command channel closed, shutting down");
        });

        Self { cmd_tx, event_rx }
    }

    pub fn spawn(&self, run_id: RunId, config_id: impl Into<String>, started_ms: i64) {
        let _ = self.cmd_tx.send(EngineCommand::Spawn(RunRequest {
            run_id,
            config_id: config_id.into(),
            started_ms,
        }));
    }

    pub fn cancel(&self, run_id: RunId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { run_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn handle_command(runtime: &tokio::runtime::Runtime, ctx: &RunContext, command: EngineCommand) {
    match command {
        EngineCommand::Spawn(request) => {
            runtime.spawn(supervise(ctx.clone(), request));
        }
        EngineCommand::Cancel { run_id } => {
            if !ctx.active.cancel(run_id) {
                runner_info!("Run {} is not active, nothing to cancel", run_id);
            }
        }
    }
}
