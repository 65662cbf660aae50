//! Job orchestration: submit a scrape run, poll it to a terminal
//! status at a fixed interval, fetch and normalize the dataset.
//!
//! The synchronous run endpoint is preferred — one round trip, no state
//! machine. The explicit submit/poll/fetch path only runs when the
//! platform reports the job exceeded the synchronous bound.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::ProxyError;
use super::normalize::normalize_matches;
use super::platform::ScrapePlatform;
use super::types::{JobHandle, JobRequest, JobStatus, ResultItem};

pub struct JobProxy {
    platform: Arc<dyn ScrapePlatform>,
    poll_interval: Duration,
    max_attempts: u32,
    sync_timeout: Duration,
}

impl std::fmt::Debug for JobProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobProxy")
            .field("platform", &self.platform.name())
            .field("poll_interval", &self.poll_interval)
            .field("max_attempts", &self.max_attempts)
            .field("sync_timeout", &self.sync_timeout)
            .finish()
    }
}

impl JobProxy {
    pub fn new(
        platform: Arc<dyn ScrapePlatform>,
        poll_interval: Duration,
        max_attempts: u32,
        sync_timeout: Duration,
    ) -> Self {
        JobProxy {
            platform,
            poll_interval,
            max_attempts,
            sync_timeout,
        }
    }

    pub async fn submit(&self, request: &JobRequest) -> Result<JobHandle, ProxyError> {
        self.platform.submit(request).await
    }

    /// Poll at the fixed interval until a terminal status or the attempt
    /// bound. `None` means the bound was hit while the job was still
    /// pending or running. Sequential: one in-flight query per handle,
    /// suspended between queries.
    async fn poll_until_terminal(
        &self,
        handle: &JobHandle,
    ) -> Result<Option<JobStatus>, ProxyError> {
        for attempt in 1..=self.max_attempts {
            sleep(self.poll_interval).await;
            let status = self.platform.poll_status(handle).await?;
            debug!(run_id = %handle.run_id, ?status, attempt, "Run status");
            if status.is_terminal() {
                return Ok(Some(status));
            }
        }
        Ok(None)
    }

    /// Wait for the job to finish. Stops at the first terminal status
    /// observed; exhausting `max_attempts` while still pending/running
    /// yields `TimedOut` rather than an error. With zero attempts no
    /// status query is made at all.
    pub async fn await_completion(&self, handle: &JobHandle) -> Result<JobStatus, ProxyError> {
        Ok(self
            .poll_until_terminal(handle)
            .await?
            .unwrap_or(JobStatus::TimedOut))
    }

    /// Normalized results of a completed run. Only valid after
    /// [`await_completion`](Self::await_completion) returned `Succeeded`.
    pub async fn fetch_results(&self, handle: &JobHandle) -> Result<Vec<ResultItem>, ProxyError> {
        let payload = self.platform.fetch_items(handle).await?;
        Ok(normalize_matches(&payload))
    }

    /// Execute a job end-to-end and return the raw dataset payload.
    ///
    /// Tries the synchronous run first; falls back to explicit
    /// submit + poll + fetch only when the platform signals the job
    /// exceeded the synchronous bound. Terminal upstream failure and
    /// local poll exhaustion are reported as distinct errors.
    pub async fn run_raw(&self, request: &JobRequest) -> Result<Value, ProxyError> {
        match self.platform.run_sync(request, self.sync_timeout).await {
            Ok(payload) => Ok(payload),
            Err(ProxyError::SyncBoundExceeded) => {
                info!(
                    platform = self.platform.name(),
                    "Synchronous run exceeded platform bound, falling back to explicit polling"
                );
                let handle = self.platform.submit(request).await?;
                debug!(run_id = %handle.run_id, "Run submitted, polling");
                match self.poll_until_terminal(&handle).await? {
                    Some(JobStatus::Succeeded) => self.platform.fetch_items(&handle).await,
                    Some(status) => Err(ProxyError::UpstreamTerminalFailure(status)),
                    None => Err(ProxyError::LocalPollTimeout),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Execute a match-scraping job and normalize the dataset.
    pub async fn run_matches(&self, request: &JobRequest) -> Result<Vec<ResultItem>, ProxyError> {
        let payload = self.run_raw(request).await?;
        Ok(normalize_matches(&payload))
    }
}
