use crate::model::JobSnapshot;

/// Finds the slot `incoming` belongs to: same job id, or same contract.
///
/// The contract key lets a resumed run that was handed a new job id replace its
/// earlier entry. Two jobs running concurrently for the same contract resolve to
/// the same slot and overwrite each other; the first matching entry wins.
pub fn resolve_slot(jobs: &[JobSnapshot], incoming: &JobSnapshot) -> Option<usize> {
    let contract = incoming.contract();
    jobs.iter().position(|job| {
        job.job_id == incoming.job_id || (contract.is_some() && job.contract() == contract)
    })
}

/// Replaces the matching entry in place, or appends.
pub fn merge(jobs: &mut Vec<JobSnapshot>, incoming: JobSnapshot) {
    match resolve_slot(jobs, &incoming) {
        Some(index) => jobs[index] = incoming,
        None => jobs.push(incoming),
    }
}
