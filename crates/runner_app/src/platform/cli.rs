use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use runner_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "prover-runner")]
#[command(about = "Run the verifier on config files and follow the remote jobs", long_about = None)]
pub struct Cli {
    /// Config files to verify, relative to the workspace root.
    #[arg(required = true)]
    pub configs: Vec<String>,

    /// Workspace root; the verifier runs here.
    #[arg(short = 'w', long, default_value = ".")]
    pub workspace: PathBuf,

    /// Settings file (defaults to `.prover_runner.ron` in the workspace).
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Verifier executable, overriding the settings file.
    #[arg(long)]
    pub command: Option<PathBuf>,

    /// Delay between status polls, overriding the settings file.
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Where the runner's own log goes.
    #[arg(long, value_enum, default_value_t = LogDest::Terminal)]
    pub log_dest: LogDest,

    /// Open offered documents (run logs) without asking.
    #[arg(long)]
    pub open_logs: bool,

    /// Keep running after the runs finish until every diagnostic went stale.
    #[arg(long)]
    pub watch: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDest {
    Terminal,
    File,
    Both,
}

impl From<LogDest> for LogDestination {
    fn from(dest: LogDest) -> Self {
        match dest {
            LogDest::Terminal => LogDestination::Terminal,
            LogDest::File => LogDestination::File,
            LogDest::Both => LogDestination::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_configs_and_overrides() {
        let cli = Cli::try_parse_from([
            "prover-runner",
            "-w",
            "/ws",
            "--poll-interval-ms",
            "250",
            "--log-dest",
            "both",
            "confs/Bank.conf",
            "confs/Vault.conf",
        ])
        .unwrap();

        assert_eq!(cli.configs, vec!["confs/Bank.conf", "confs/Vault.conf"]);
        assert_eq!(cli.workspace, PathBuf::from("/ws"));
        assert_eq!(cli.poll_interval_ms, Some(250));
        assert_eq!(cli.log_dest, LogDest::Both);
        assert!(!cli.watch);
    }

    #[test]
    fn at_least_one_config_is_required() {
        assert!(Cli::try_parse_from(["prover-runner"]).is_err());
    }
}
