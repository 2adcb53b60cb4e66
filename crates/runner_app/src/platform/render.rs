use runner_core::{AppViewModel, JobRowView, RunRowView, RunStatus};

/// Prints the run and job tables whenever they differ from what was last shown.
#[derive(Default)]
pub struct Renderer {
    last: Option<AppViewModel>,
}

impl Renderer {
    pub fn render(&mut self, mut view: AppViewModel) {
        view.dirty = false;
        if self.last.as_ref() == Some(&view) {
            return;
        }
        for line in render_lines(&view) {
            println!("{line}");
        }
        self.last = Some(view);
    }
}

fn render_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.runs.len() + view.jobs.len() + 2);
    lines.push(format!("runs ({})", view.runs.len()));
    lines.extend(view.runs.iter().map(run_line));
    if !view.jobs.is_empty() {
        lines.push(format!("jobs ({})", view.jobs.len()));
        lines.extend(view.jobs.iter().map(job_line));
    }
    lines
}

fn run_line(run: &RunRowView) -> String {
    let status = match run.status {
        RunStatus::Starting => "starting".to_string(),
        RunStatus::Running => "running".to_string(),
        RunStatus::Detached => "detached".to_string(),
        RunStatus::Exited { code: Some(code) } => format!("exited {code}"),
        RunStatus::Exited { code: None } => "terminated".to_string(),
    };
    let polls = if run.active_polls > 0 {
        format!(" polling x{}", run.active_polls)
    } else {
        String::new()
    };
    format!("  #{} {} [{}]{}", run.run_id, run.config_id, status, polls)
}

fn job_line(job: &JobRowView) -> String {
    format!(
        "  {} {} {}{}{}",
        job.job_id,
        job.contract.as_deref().unwrap_or("-"),
        job.status,
        if job.ended { " (ended)" } else { "" },
        job.created_at
            .as_deref()
            .map(|posted| format!(" posted {posted}"))
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner_core::JobStatus;

    #[test]
    fn lists_runs_and_jobs() {
        let view = AppViewModel {
            runs: vec![RunRowView {
                run_id: 1,
                config_id: "confs/Bank.conf".to_string(),
                status: RunStatus::Running,
                log_path: None,
                active_polls: 1,
            }],
            jobs: vec![JobRowView {
                job_id: "j1".to_string(),
                contract: Some("Bank".to_string()),
                status: JobStatus::Running,
                ended: false,
                created_at: None,
            }],
            dirty: true,
        };
        assert_eq!(
            render_lines(&view),
            vec![
                "runs (1)".to_string(),
                "  #1 confs/Bank.conf [running] polling x1".to_string(),
                "jobs (1)".to_string(),
                "  j1 Bank RUNNING".to_string(),
            ]
        );
    }

    #[test]
    fn terminated_run_has_no_code() {
        let run = RunRowView {
            run_id: 2,
            config_id: "a.conf".to_string(),
            status: RunStatus::Exited { code: None },
            log_path: None,
            active_polls: 0,
        };
        assert_eq!(run_line(&run), "  #2 a.conf [terminated]");
    }
}
