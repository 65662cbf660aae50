pub mod flashscore;
pub mod passthrough;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ProxyError;
use crate::scrape::JobProxy;
use passthrough::UpstreamProxy;

#[derive(Clone)]
pub struct AppState {
    /// Absent when no platform token was configured; scrape endpoints
    /// then answer 500 without making any outbound call.
    pub scraper: Option<Arc<JobProxy>>,
    pub api_football: Arc<UpstreamProxy>,
    pub football_data: Arc<UpstreamProxy>,
    /// Overall budget per scrape request; polls past it are abandoned.
    pub request_deadline: Duration,
}

/// Build the Axum router for the proxy.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/flashscore", post(flashscore::live).options(preflight))
        .route(
            "/api/flashscore/matches",
            get(flashscore::matches).options(preflight),
        )
        .route(
            "/api/flashscore/fixtures",
            post(flashscore::fixtures).options(preflight),
        )
        .route(
            "/api/flashscore/history",
            post(flashscore::history).options(preflight),
        )
        .route(
            "/api/flashscore/standings",
            get(flashscore::standings).options(preflight),
        )
        .route(
            "/api/flashscore/overview",
            get(flashscore::overview).options(preflight),
        )
        .route("/api/af", get(passthrough::api_football).options(preflight))
        .route(
            "/api/football-data",
            get(passthrough::football_data).options(preflight),
        )
        .layer(cors_layer())
        .with_state(Arc::new(state))
}

/// Browser clients call the proxy cross-origin, so every route allows
/// any origin with the methods and headers the frontend uses.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// OPTIONS on any API route: 204, no upstream interaction at all.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn index_handler() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "service": "matchday-proxy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Run a scrape future under the request deadline. Hitting the deadline
/// aborts the remaining polls and reports the local timeout.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, ProxyError>>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| ProxyError::LocalPollTimeout)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preflight_is_204() {
        assert_eq!(preflight().await, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_deadline_converts_to_local_timeout() {
        let res: Result<(), ProxyError> = with_deadline(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(res, Err(ProxyError::LocalPollTimeout)));
    }

    #[tokio::test]
    async fn test_deadline_passes_result_through() {
        let res = with_deadline(Duration::from_secs(5), async { Ok::<_, ProxyError>(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }
}
