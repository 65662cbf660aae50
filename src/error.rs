use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::scrape::types::JobStatus;

/// Failure taxonomy for the proxy. Each class maps to one HTTP status;
/// every error renders as a `{ "ok": false, "error": ... }` JSON body so
/// nothing propagates to the client as an unhandled fault.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing or invalid request parameter.
    #[error("missing or invalid parameter: {0}")]
    BadInput(String),

    /// A required server credential is absent. Raised before any
    /// outbound call is attempted.
    #[error("{0} not configured")]
    ConfigMissing(&'static str),

    /// The run-creation call errored or returned a non-success status.
    #[error("job submission failed: {0}")]
    UpstreamSubmitFailed(String),

    /// Submission response carried no run or dataset identifier.
    #[error("no run or dataset id in platform response")]
    MalformedResponse,

    /// A status query or dataset fetch failed upstream.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The platform's synchronous run endpoint reported the job exceeded
    /// its blocking-call bound. Handled internally by falling back to
    /// explicit submit + poll; only surfaces if the fallback is disabled.
    #[error("synchronous run exceeded the platform bound")]
    SyncBoundExceeded,

    /// The job reached Failed/Aborted/TimedOut on the platform itself.
    #[error("job ended upstream with status {0:?}")]
    UpstreamTerminalFailure(JobStatus),

    /// Poll attempts (or the request deadline) were exhausted while the
    /// job was still pending or running. Distinct from an upstream
    /// terminal failure: the job may still be going, we stopped waiting.
    #[error("job did not reach a terminal status in time")]
    LocalPollTimeout,

    /// Transport-level failure talking to an upstream service.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::BadInput(_) => StatusCode::BAD_REQUEST,
            ProxyError::ConfigMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::UpstreamSubmitFailed(_)
            | ProxyError::MalformedResponse
            | ProxyError::Upstream(_)
            | ProxyError::Transport(_) => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTerminalFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::SyncBoundExceeded | ProxyError::LocalPollTimeout => {
                StatusCode::GATEWAY_TIMEOUT
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "ok": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            ProxyError::BadInput("path".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::ConfigMissing("APIFY_TOKEN").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ProxyError::UpstreamSubmitFailed("503".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::UpstreamTerminalFailure(JobStatus::Failed).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ProxyError::LocalPollTimeout.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
