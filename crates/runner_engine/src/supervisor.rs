//! Launches the verifier for one config and follows it until it closes.

use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::{mpsc, Arc, Mutex, PoisonError};

use runner_core::{discover_progress_url, strip_color_codes, RunId};
use runner_logging::{runner_debug, runner_error, runner_info, runner_warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::poll::{poll_job, ChannelSnapshotSink, StatusClient};
use crate::{EngineConfig, EngineEvent, RunLog};

/// What is still running on behalf of one run.
struct RunSlot {
    token: CancellationToken,
    process_live: bool,
    detached: bool,
    polls: usize,
}

impl RunSlot {
    fn is_finished(&self) -> bool {
        !self.process_live && self.polls == 0
    }
}

/// Runs that may still be cancelled, keyed by run id. A run stays registered
/// until its process has closed and its last poll loop has stopped.
#[derive(Clone, Default)]
pub(crate) struct ActiveRuns {
    inner: Arc<Mutex<HashMap<RunId, RunSlot>>>,
}

impl ActiveRuns {
    fn insert(&self, run_id: RunId, token: CancellationToken) {
        self.lock().insert(
            run_id,
            RunSlot {
                token,
                process_live: true,
                detached: false,
                polls: 0,
            },
        );
    }

    /// Marks the process as no longer cancellable. Returns true the first time.
    fn detach(&self, run_id: RunId) -> bool {
        match self.lock().get_mut(&run_id) {
            Some(slot) if !slot.detached => {
                slot.detached = true;
                true
            }
            _ => false,
        }
    }

    fn process_exited(&self, run_id: RunId) {
        self.update_slot(run_id, |slot| slot.process_live = false);
    }

    fn poll_started(&self, run_id: RunId) {
        self.update_slot(run_id, |slot| slot.polls += 1);
    }

    fn poll_stopped(&self, run_id: RunId) {
        self.update_slot(run_id, |slot| slot.polls = slot.polls.saturating_sub(1));
    }

    fn update_slot(&self, run_id: RunId, change: impl FnOnce(&mut RunSlot)) {
        let mut runs = self.lock();
        let finished = match runs.get_mut(&run_id) {
            Some(slot) => {
                change(slot);
                slot.is_finished()
            }
            None => false,
        };
        if finished {
            runs.remove(&run_id);
        }
    }

    /// Cancels the run's process and poll loops. Returns false if there is
    /// nothing to cancel, or the process is still running but detached.
    pub(crate) fn cancel(&self, run_id: RunId) -> bool {
        match self.lock().get(&run_id) {
            Some(slot) if !(slot.process_live && slot.detached) => {
                slot.token.cancel();
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    fn is_registered(&self, run_id: RunId) -> bool {
        self.lock().contains_key(&run_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RunId, RunSlot>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub run_id: RunId,
    pub config_id: String,
    pub started_ms: i64,
}

/// Everything a supervised run needs from the engine.
#[derive(Clone)]
pub(crate) struct RunContext {
    pub config: Arc<EngineConfig>,
    pub client: Arc<dyn StatusClient>,
    pub events: mpsc::Sender<EngineEvent>,
    pub active: ActiveRuns,
}

impl RunContext {
    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }
}

pub(crate) async fn supervise(ctx: RunContext, request: RunRequest) {
    let RunRequest {
        run_id,
        config_id,
        started_ms,
    } = request;

    let mut child = match Command::new(&ctx.config.command)
        .arg(&config_id)
        .current_dir(&ctx.config.workspace_root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            runner_error!(
                "Run {} could not start {:?}: {}",
                run_id,
                ctx.config.command,
                err
            );
            ctx.emit(EngineEvent::SpawnFailed {
                run_id,
                message: err.to_string(),
            });
            return;
        }
    };

    // Dropping the child on this path kills it.
    let log = match RunLog::create(&ctx.config.log_dir(), &config_id, started_ms) {
        Ok(log) => log,
        Err(err) => {
            runner_error!("Run {} could not open its log: {}", run_id, err);
            ctx.emit(EngineEvent::SpawnFailed {
                run_id,
                message: err.to_string(),
            });
            return;
        }
    };

    let cancel = CancellationToken::new();
    ctx.active.insert(run_id, cancel.clone());
    runner_info!(
        "Run {} started {:?} {} (pid {:?}), logging to {:?}",
        run_id,
        ctx.config.command,
        config_id,
        child.id(),
        log.path()
    );
    ctx.emit(EngineEvent::RunStarted {
        run_id,
        pid: child.id(),
        log_path: log.path().to_path_buf(),
    });

    let stdout_task = child.stdout.take().map(|stdout| {
        tokio::spawn(capture_stdout(
            ctx.clone(),
            run_id,
            stdout,
            log.clone(),
            cancel.clone(),
        ))
    });
    let stderr_task = child
        .stderr
        .take()
        .map(|stderr| tokio::spawn(watch_stderr(ctx.clone(), run_id, stderr)));

    let status = tokio::select! {
        status = child.wait() => status,
        _ = cancel.cancelled() => {
            runner_info!("Run {} cancelled, terminating verifier", run_id);
            terminate(&mut child);
            child.wait().await
        }
    };

    // Drain both streams so the log is complete before the exit is reported.
    join_reader(stdout_task).await;
    join_reader(stderr_task).await;
    ctx.active.process_exited(run_id);

    let code = match status {
        Ok(status) => status.code(),
        Err(err) => {
            ctx.emit(EngineEvent::StreamFailed {
                run_id,
                message: format!("Verifier process error: {err}"),
            });
            None
        }
    };
    runner_info!("Run {} exited with code {:?}", run_id, code);
    ctx.emit(EngineEvent::RunExited { run_id, code });
}

async fn join_reader(task: Option<JoinHandle<()>>) {
    if let Some(task) = task {
        if let Err(err) = task.await {
            runner_warn!("Output reader ended abnormally: {}", err);
        }
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    match child.id() {
        Some(pid) => {
            if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                runner_warn!("Failed to signal verifier {}: {}", pid, err);
            }
        }
        None => runner_debug!("Verifier already reaped, nothing to terminate"),
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    if let Err(err) = child.start_kill() {
        runner_warn!("Failed to kill verifier: {}", err);
    }
}

/// Reads newline-terminated chunks, keeping the terminator. A trailing chunk
/// without a newline is returned as is.
async fn next_chunk<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    buf.clear();
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

async fn capture_stdout<R: AsyncRead + Unpin>(
    ctx: RunContext,
    run_id: RunId,
    stdout: R,
    log: RunLog,
    cancel: CancellationToken,
) {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    let mut polled_urls = HashSet::new();

    loop {
        let chunk = match next_chunk(&mut reader, &mut buf).await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) => {
                ctx.active.detach(run_id);
                ctx.emit(EngineEvent::StreamFailed {
                    run_id,
                    message: format!("Failed to read verifier output: {err}"),
                });
                break;
            }
        };

        let clean = strip_color_codes(&chunk);
        if let Err(err) = log.append(&clean) {
            runner_warn!("Run {} failed to append to {:?}: {}", run_id, log.path(), err);
        }

        if let Some(url) = discover_progress_url(&clean) {
            // One loop per URL; a different URL later in the run gets its own.
            if polled_urls.insert(url.clone()) {
                start_polling(&ctx, run_id, url, cancel.child_token());
            }
        }
    }
}

async fn watch_stderr<R: AsyncRead + Unpin>(ctx: RunContext, run_id: RunId, stderr: R) {
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();

    loop {
        match next_chunk(&mut reader, &mut buf).await {
            Ok(Some(chunk)) => {
                let text = strip_color_codes(&chunk);
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if ctx.active.detach(run_id) {
                    runner_warn!("Run {} wrote to stderr, no longer tracked as active", run_id);
                }
                ctx.emit(EngineEvent::StreamFailed {
                    run_id,
                    message: text.to_string(),
                });
            }
            Ok(None) => break,
            Err(err) => {
                ctx.active.detach(run_id);
                ctx.emit(EngineEvent::StreamFailed {
                    run_id,
                    message: format!("Failed to read verifier errors: {err}"),
                });
                break;
            }
        }
    }
}

fn start_polling(ctx: &RunContext, run_id: RunId, url: String, cancel: CancellationToken) {
    runner_info!("Run {} polling {}", run_id, url);
    ctx.active.poll_started(run_id);
    ctx.emit(EngineEvent::PollStarted {
        run_id,
        url: url.clone(),
    });

    let ctx = ctx.clone();
    tokio::spawn(async move {
        let sink = ChannelSnapshotSink::new(run_id, ctx.events.clone());
        let outcome = poll_job(
            ctx.client.as_ref(),
            &url,
            &ctx.config.poll,
            &cancel,
            &sink,
        )
        .await;
        runner_debug!("Run {} stopped polling {}: {:?}", run_id, url, outcome);
        ctx.active.poll_stopped(run_id);
        ctx.emit(EngineEvent::PollStopped { run_id, outcome });
    });
}
