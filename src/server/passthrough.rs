//! Key-masking passthrough proxies for the plain REST upstreams
//! (API-Football and football-data.org). The browser sends the upstream
//! path in `?path=`; the proxy attaches the server-side key, mirrors the
//! upstream status and JSON body, and never exposes the credential.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::debug;

use crate::error::ProxyError;
use super::AppState;

const RATE_LIMIT_HEADER: &str = "x-ratelimit-remaining";

pub struct UpstreamProxy {
    http: reqwest::Client,
    base_url: String,
    auth_header: &'static str,
    api_key: Option<String>,
    /// Env var named in the 500 body when the key is absent.
    key_name: &'static str,
    /// API-Football exposes its remaining quota in a response header
    /// the frontend tracks.
    forward_rate_limit: bool,
}

impl UpstreamProxy {
    pub fn api_football(api_key: Option<String>, base_url: &str) -> Result<Self> {
        Self::new(api_key, base_url, "x-apisports-key", "API_FOOTBALL_KEY", true)
    }

    pub fn football_data(api_key: Option<String>, base_url: &str) -> Result<Self> {
        Self::new(api_key, base_url, "X-Auth-Token", "FOOTBALL_DATA_KEY", false)
    }

    fn new(
        api_key: Option<String>,
        base_url: &str,
        auth_header: &'static str,
        key_name: &'static str,
        forward_rate_limit: bool,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(UpstreamProxy {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
            api_key,
            key_name,
            forward_rate_limit,
        })
    }

    /// Forward one GET request. `params` must carry `path`; every other
    /// entry becomes part of the upstream query string.
    pub async fn forward(&self, params: &HashMap<String, String>) -> Result<Response, ProxyError> {
        let path = params
            .get("path")
            .ok_or_else(|| ProxyError::BadInput("path".into()))?;
        if !path.starts_with('/') {
            return Err(ProxyError::BadInput("path must start with '/'".into()));
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProxyError::ConfigMissing(self.key_name))?;

        let url = build_url(&self.base_url, path, params);
        debug!(url = %url, "Forwarding upstream request");

        let resp = self
            .http
            .get(&url)
            .header(self.auth_header, api_key)
            .send()
            .await?;

        let status =
            StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let rate_limit = resp.headers().get(RATE_LIMIT_HEADER).cloned();
        let data: Value = resp
            .json()
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let mut response = (status, Json(data)).into_response();
        if self.forward_rate_limit {
            if let Some(remaining) = rate_limit {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(RATE_LIMIT_HEADER), remaining);
            }
        }
        Ok(response)
    }
}

/// Upstream URL from base, path and the query params minus `path`.
fn build_url(base_url: &str, path: &str, params: &HashMap<String, String>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    // BTreeMap-style ordering keeps the URL deterministic for logging
    // and tests.
    let mut rest: Vec<(&String, &String)> =
        params.iter().filter(|(k, _)| *k != "path").collect();
    rest.sort();
    for (k, v) in rest {
        query.append_pair(k, v);
    }
    let query = query.finish();

    if query.is_empty() {
        format!("{}{}", base_url, path)
    } else {
        format!("{}{}?{}", base_url, path, query)
    }
}

/// GET /api/af — API-Football (v3.football.api-sports.io) passthrough.
pub async fn api_football(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ProxyError> {
    state.api_football.forward(&params).await
}

/// GET /api/football-data — football-data.org v4 passthrough.
pub async fn football_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ProxyError> {
    state.football_data.forward(&params).await
}
