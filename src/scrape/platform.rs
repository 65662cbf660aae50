//! The actor-platform seam: a trait for job execution plus the Apify
//! implementation. Tests drive the job proxy through a fake platform.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ProxyError;
use super::types::{JobHandle, JobRequest, JobStatus};

/// Everything the job proxy needs from an actor-execution platform.
#[async_trait]
pub trait ScrapePlatform: Send + Sync {
    /// Create a run for the given job. Returns its handle immediately.
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, ProxyError>;

    /// One status query for a previously submitted run.
    async fn poll_status(&self, handle: &JobHandle) -> Result<JobStatus, ProxyError>;

    /// Raw dataset payload of a run. Only meaningful once the run
    /// succeeded.
    async fn fetch_items(&self, handle: &JobHandle) -> Result<Value, ProxyError>;

    /// Single blocking call: submit, wait and return the dataset in one
    /// round trip, bounded by `timeout`. Must fail with
    /// [`ProxyError::SyncBoundExceeded`] when the platform reports the
    /// job outgrew the synchronous bound.
    async fn run_sync(&self, request: &JobRequest, timeout: Duration)
        -> Result<Value, ProxyError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Run metadata as the Apify API reports it.
#[derive(Debug, Clone, Deserialize)]
struct RunData {
    id: String,
    status: String,
    #[serde(rename = "defaultDatasetId")]
    default_dataset_id: Option<String>,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

/// Apify REST implementation of [`ScrapePlatform`], pointed at the
/// FlashScore scraper actor.
pub struct ApifyPlatform {
    http: reqwest::Client,
    token: String,
    actor_id: String,
    /// Base URL for overriding in tests
    base_url: String,
}

impl ApifyPlatform {
    pub fn new(token: String, actor_id: &str, base_url: Option<&str>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApifyPlatform {
            http,
            token,
            actor_id: actor_id.to_string(),
            base_url: base_url.unwrap_or("https://api.apify.com/v2").to_string(),
        })
    }

    async fn error_detail(resp: reqwest::Response) -> String {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        format!("{}: {}", status, snippet)
    }
}

#[async_trait]
impl ScrapePlatform for ApifyPlatform {
    fn name(&self) -> &str {
        "apify"
    }

    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, ProxyError> {
        let url = format!("{}/acts/{}/runs", self.base_url, self.actor_id);
        debug!(actor = %self.actor_id, "Submitting scrape run");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| ProxyError::UpstreamSubmitFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProxyError::UpstreamSubmitFailed(
                Self::error_detail(resp).await,
            ));
        }

        let run: ApiResponse<RunData> = resp
            .json()
            .await
            .map_err(|_| ProxyError::MalformedResponse)?;
        let dataset_id = run
            .data
            .default_dataset_id
            .filter(|id| !id.is_empty())
            .ok_or(ProxyError::MalformedResponse)?;
        if run.data.id.is_empty() {
            return Err(ProxyError::MalformedResponse);
        }

        Ok(JobHandle {
            run_id: run.data.id,
            dataset_id,
        })
    }

    async fn poll_status(&self, handle: &JobHandle) -> Result<JobStatus, ProxyError> {
        let url = format!("{}/actor-runs/{}", self.base_url, handle.run_id);
        let resp = self.http.get(&url).bearer_auth(&self.token).send().await?;

        if !resp.status().is_success() {
            return Err(ProxyError::Upstream(Self::error_detail(resp).await));
        }

        let run: ApiResponse<RunData> = resp
            .json()
            .await
            .map_err(|_| ProxyError::MalformedResponse)?;
        Ok(JobStatus::from_platform(&run.data.status))
    }

    async fn fetch_items(&self, handle: &JobHandle) -> Result<Value, ProxyError> {
        let url = format!(
            "{}/datasets/{}/items?format=json",
            self.base_url, handle.dataset_id
        );
        let resp = self.http.get(&url).bearer_auth(&self.token).send().await?;

        if !resp.status().is_success() {
            return Err(ProxyError::Upstream(Self::error_detail(resp).await));
        }

        Ok(resp.json().await?)
    }

    async fn run_sync(
        &self,
        request: &JobRequest,
        timeout: Duration,
    ) -> Result<Value, ProxyError> {
        let url = format!(
            "{}/acts/{}/run-sync-get-dataset-items?timeout={}",
            self.base_url,
            self.actor_id,
            timeout.as_secs()
        );
        debug!(actor = %self.actor_id, timeout_secs = timeout.as_secs(), "Synchronous scrape run");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            // The blocking call outlives the client default timeout.
            .timeout(timeout + Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| ProxyError::UpstreamSubmitFailed(e.to_string()))?;

        // 408 is the platform's signal that the run outgrew the
        // synchronous bound, not a generic failure.
        if resp.status() == reqwest::StatusCode::REQUEST_TIMEOUT {
            return Err(ProxyError::SyncBoundExceeded);
        }
        if !resp.status().is_success() {
            return Err(ProxyError::UpstreamSubmitFailed(
                Self::error_detail(resp).await,
            ));
        }

        Ok(resp.json().await?)
    }
}
