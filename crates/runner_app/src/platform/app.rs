use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use runner_core::{update, AppState, Msg, RunStatus};
use runner_logging::{runner_debug, runner_info, runner_warn};

use super::cli::Cli;
use super::effects::EffectRunner;
use super::render::Renderer;
use super::settings::{load_settings, SETTINGS_FILENAME};
use super::watch::WorkspaceWatcher;
use super::workbench::TerminalWorkbench;

const TICK: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if !runner_logging::initialize(cli.log_dest.into(), level, &runner_logging::default_log_path())
    {
        eprintln!("Failed to initialize logging");
    }

    let workspace = cli
        .workspace
        .canonicalize()
        .with_context(|| format!("workspace {:?} is not accessible", cli.workspace))?;
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(|| workspace.join(SETTINGS_FILENAME));
    let mut settings = load_settings(&settings_path);
    if let Some(command) = cli.command.clone() {
        settings.command = command;
    }
    if let Some(interval) = cli.poll_interval_ms {
        settings.poll_interval_ms = interval;
    }
    let config = settings.engine_config(&workspace);
    runner_info!(
        "Workspace {:?}, verifier {:?}, poll every {} ms",
        workspace,
        config.command,
        settings.poll_interval_ms
    );

    let workbench = Arc::new(TerminalWorkbench::new(workspace.clone(), cli.open_logs));
    let mut effects = EffectRunner::new(config, workbench);
    let mut renderer = Renderer::default();
    let mut watcher = WatchSlot::default();
    let mut state = AppState::new();

    for config_id in &cli.configs {
        let started_ms = chrono::Utc::now().timestamp_millis();
        state = dispatch(
            state,
            Msg::RunRequested {
                config_id: config_id.clone(),
                started_ms,
            },
            &mut effects,
        );
    }

    loop {
        let msg = effects.next_msg(TICK).unwrap_or(Msg::Tick);
        // Edits queued so far predate anything this message publishes.
        if let Some(active) = &watcher.active {
            for event in active.drain() {
                effects.on_file_event(&event);
            }
        }
        state = dispatch(state, msg, &mut effects);
        watcher.sync(effects.is_watching(), &workspace);

        if state.consume_dirty() {
            renderer.render(state.view());
        }

        let lingering = cli.watch && effects.is_watching() && watcher.active.is_some();
        if state.is_settled() && !lingering {
            break;
        }
    }

    let failed_runs = state
        .view()
        .runs
        .iter()
        .filter(|run| run.status != RunStatus::Exited { code: Some(0) })
        .count();
    runner_info!(
        "Done: {} failed run(s), {} error notification(s)",
        failed_runs,
        effects.error_count()
    );
    if failed_runs > 0 || effects.error_count() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn dispatch(state: AppState, msg: Msg, effects: &mut EffectRunner) -> AppState {
    let (next, produced) = update(state, msg);
    effects.run(produced);
    next
}

/// Watcher that only exists while published diagnostics wait for edits.
#[derive(Default)]
struct WatchSlot {
    active: Option<WorkspaceWatcher>,
    unavailable: bool,
}

impl WatchSlot {
    fn sync(&mut self, wanted: bool, root: &Path) {
        match (self.active.is_some(), wanted) {
            (false, true) if !self.unavailable => match WorkspaceWatcher::start(root) {
                Ok(started) => {
                    runner_debug!("Watching {:?} for edits", root);
                    self.active = Some(started);
                }
                Err(err) => {
                    runner_warn!("Cannot watch {:?}: {}", root, err);
                    self.unavailable = true;
                }
            },
            (true, false) => {
                runner_debug!("No pending diagnostics, watcher stopped");
                self.active = None;
            }
            _ => {}
        }
    }
}
