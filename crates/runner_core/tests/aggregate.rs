use runner_core::{merge, resolve_slot, JobSnapshot, JobStatus};
use serde_json::json;

fn job(job_id: &str, contract: &str, status: JobStatus) -> JobSnapshot {
    JobSnapshot {
        job_id: job_id.to_string(),
        status,
        ended: false,
        cloud_errors: Vec::new(),
        progress: json!({ "contract": contract }),
        created_at: None,
    }
}

#[test]
fn same_contract_new_job_id_replaces_in_place() {
    let mut jobs = vec![job("1", "A", JobStatus::Running)];
    merge(&mut jobs, job("2", "A", JobStatus::Succeeded));

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job_id, "2");
    assert_eq!(jobs[0].status, JobStatus::Succeeded);
}

#[test]
fn different_contract_and_id_appends() {
    let mut jobs = vec![job("1", "A", JobStatus::Running)];
    merge(&mut jobs, job("2", "B", JobStatus::Running));

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[1].job_id, "2");
}

#[test]
fn same_job_id_replaces_even_if_contract_changes() {
    let mut jobs = vec![job("1", "A", JobStatus::Pending), job("9", "C", JobStatus::Running)];
    merge(&mut jobs, job("1", "B", JobStatus::Running));

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].contract(), Some("B"));
}

#[test]
fn missing_contract_only_matches_by_id() {
    let mut untitled = job("5", "A", JobStatus::Pending);
    untitled.progress = json!({});
    let jobs = vec![untitled.clone()];

    let mut other = job("6", "A", JobStatus::Pending);
    other.progress = json!({});
    assert_eq!(resolve_slot(&jobs, &other), None);
    assert_eq!(resolve_slot(&jobs, &untitled), Some(0));
}
