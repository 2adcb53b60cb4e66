use std::sync::mpsc;

use runner_core::{job_data_url, JobSnapshot, JobStatus, RunId};
use runner_logging::{runner_debug, runner_info, runner_warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, PollError, PollFailureKind, PollOutcome, PollSettings};

/// Body of `GET <progress url>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEnvelope {
    pub job_id: String,
    pub job_status: JobStatus,
    #[serde(default)]
    pub job_ended: bool,
    #[serde(default)]
    pub cloud_error_messages: Option<Vec<String>>,
    /// JSON document encoded as a string.
    #[serde(default)]
    pub verification_progress: Option<String>,
}

impl StatusEnvelope {
    pub fn into_snapshot(self, created_at: Option<String>) -> Result<JobSnapshot, PollError> {
        let progress = decode_progress(self.verification_progress.as_deref())?;
        Ok(JobSnapshot {
            job_id: self.job_id,
            status: self.job_status,
            ended: self.job_ended,
            cloud_errors: self.cloud_error_messages.unwrap_or_default(),
            progress,
            created_at,
        })
    }
}

/// Body of the companion `GET <job data url>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobData {
    #[serde(rename = "postTime", default)]
    pub post_time: Option<String>,
}

fn decode_progress(raw: Option<&str>) -> Result<Value, PollError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Value::Object(Default::default())),
        Some(text) => serde_json::from_str(text).map_err(|err| {
            PollError::new(
                PollFailureKind::Decode,
                format!("verificationProgress: {err}"),
            )
        }),
    }
}

/// Receives snapshots worth showing.
pub trait SnapshotSink: Send + Sync {
    fn deliver(&self, snapshot: JobSnapshot, is_final: bool);
}

pub struct ChannelSnapshotSink {
    run_id: RunId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelSnapshotSink {
    pub fn new(run_id: RunId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { run_id, tx }
    }
}

impl SnapshotSink for ChannelSnapshotSink {
    fn deliver(&self, snapshot: JobSnapshot, is_final: bool) {
        let _ = self.tx.send(EngineEvent::Snapshot {
            run_id: self.run_id,
            snapshot,
            is_final,
        });
    }
}

#[async_trait::async_trait]
pub trait StatusClient: Send + Sync {
    async fn fetch_status(&self, url: &str) -> Result<StatusEnvelope, PollError>;

    async fn fetch_job_data(&self, url: &str) -> Result<JobData, PollError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStatusClient {
    settings: PollSettings,
}

impl ReqwestStatusClient {
    pub fn new(settings: PollSettings) -> Self {
        Self { settings }
    }

    // No overall request timeout: a silent endpoint stalls only its own loop.
    fn build_client(&self) -> Result<reqwest::Client, PollError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| PollError::new(PollFailureKind::Network, err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, PollError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| PollError::new(PollFailureKind::InvalidUrl, err.to_string()))?;
        let client = self.build_client()?;

        let response = client
            .get(parsed)
            .send()
            .await
            .map_err(|err| PollError::new(PollFailureKind::Network, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::new(
                PollFailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|err| PollError::new(PollFailureKind::Network, err.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|err| PollError::new(PollFailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl StatusClient for ReqwestStatusClient {
    async fn fetch_status(&self, url: &str) -> Result<StatusEnvelope, PollError> {
        self.get_json(url).await
    }

    async fn fetch_job_data(&self, url: &str) -> Result<JobData, PollError> {
        self.get_json(url).await
    }
}

/// Polls `progress_url` until the job reaches a terminal state, fails, or is
/// cancelled. Exactly one request is in flight at a time and the next cycle
/// starts `settings.interval` after the previous one finished.
pub async fn poll_job(
    client: &dyn StatusClient,
    progress_url: &str,
    settings: &PollSettings,
    cancel: &CancellationToken,
    sink: &dyn SnapshotSink,
) -> PollOutcome {
    let job_data = job_data_url(progress_url, &settings.job_data_attr);
    let mut created_at: Option<String> = None;

    loop {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        let envelope = match client.fetch_status(progress_url).await {
            Ok(envelope) => envelope,
            Err(err) => {
                runner_warn!("Polling {} failed: {}", progress_url, err);
                return PollOutcome::Unavailable(err);
            }
        };

        if created_at.is_none() {
            // Best effort: a failure here only leaves the creation time blank.
            match client.fetch_job_data(&job_data).await {
                Ok(data) => created_at = data.post_time,
                Err(err) => runner_debug!("Job data from {} unavailable: {}", job_data, err),
            }
        }

        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        let snapshot = match envelope.into_snapshot(created_at.clone()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                runner_warn!("Polling {} returned malformed progress: {}", progress_url, err);
                return PollOutcome::Unavailable(err);
            }
        };

        match snapshot.status {
            JobStatus::Failed => {
                runner_info!("Job {} failed remotely", snapshot.job_id);
                return PollOutcome::Failed(snapshot.cloud_errors);
            }
            JobStatus::Succeeded if snapshot.ended => {
                if !snapshot.has_progress() {
                    return PollOutcome::EmptyResult;
                }
                runner_info!("Job {} finished", snapshot.job_id);
                sink.deliver(snapshot, true);
                return PollOutcome::Completed;
            }
            _ => {
                if snapshot.has_progress() {
                    sink.deliver(snapshot, false);
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}
