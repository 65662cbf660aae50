//! FlashScore scrape endpoints. Each handler builds a job request,
//! runs it through the job proxy under the request deadline and shapes
//! the response for the frontend.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::ProxyError;
use crate::scrape::normalize::{group_standings, is_finished, LEAGUE_KEYS};
use crate::scrape::{JobProxy, JobRequest, ResultItem};
use super::{with_deadline, AppState};

/// Frontend-facing configuration accepted in POST bodies. Parsed
/// leniently: a malformed or absent body means defaults take over.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScrapeOptions {
    pub leagues: Option<Vec<String>>,
    #[serde(rename = "dateOffset")]
    pub date_offset: Option<i64>,
    pub status: Option<String>,
    #[serde(rename = "maxItems")]
    pub max_items: Option<u32>,
}

fn parse_options(body: &[u8]) -> ScrapeOptions {
    serde_json::from_slice(body).unwrap_or_default()
}

fn default_leagues() -> Vec<String> {
    LEAGUE_KEYS.iter().map(|(id, _)| id.to_string()).collect()
}

/// Offsets are taken as a day count in either direction and clamped to
/// a sane scanning window.
fn clamp_offset(raw: Option<i64>, default: u8) -> u8 {
    match raw {
        Some(v) => v.abs().clamp(1, 7) as u8,
        None => default,
    }
}

/// Dates from tomorrow through `days_ahead` days out.
fn upcoming_dates(today: NaiveDate, days_ahead: u8) -> Vec<String> {
    (1..=i64::from(days_ahead))
        .map(|i| (today + ChronoDuration::days(i)).to_string())
        .collect()
}

/// Dates from `days_back` days ago through today, oldest first. Today
/// is included to pick up matches already finished.
fn recent_dates(today: NaiveDate, days_back: u8) -> Vec<String> {
    (1..=i64::from(days_back))
        .rev()
        .map(|i| (today - ChronoDuration::days(i)).to_string())
        .chain(std::iter::once(today.to_string()))
        .collect()
}

/// Keep finished matches only, lowercasing statuses and zero-filling
/// scores the scraper left out. An explicit status filter overrides the
/// finished-set default.
fn finished_results(items: Vec<ResultItem>, status_filter: Option<&str>) -> Vec<ResultItem> {
    items
        .into_iter()
        .map(|mut m| {
            m.status = m.status.to_lowercase();
            m.home_score = Some(m.home_score.unwrap_or(0));
            m.away_score = Some(m.away_score.unwrap_or(0));
            m
        })
        .filter(|m| match status_filter {
            Some(wanted) => m.status == wanted,
            None => is_finished(&m.status),
        })
        .collect()
}

/// Fixtures the scraper reports without a status are upcoming.
fn mark_scheduled(items: &mut [ResultItem]) {
    for m in items {
        if m.status.is_empty() {
            m.status = "scheduled".into();
        }
    }
}

fn scraper(state: &AppState) -> Result<&Arc<JobProxy>, ProxyError> {
    state
        .scraper
        .as_ref()
        .ok_or(ProxyError::ConfigMissing("APIFY_TOKEN"))
}

fn respond(body: serde_json::Value, cache: &'static str) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, cache)], Json(body))
}

/// POST /api/flashscore — today's matches for the requested leagues.
pub async fn live(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ProxyError> {
    let proxy = scraper(&state)?;
    let opts = parse_options(&body);
    let leagues = opts.leagues.unwrap_or_else(default_leagues);
    let today = Utc::now().date_naive().to_string();

    let request = JobRequest::matches(leagues, &today, &today)
        .with_max_items(opts.max_items.unwrap_or(100).clamp(1, 500));
    let mut items = with_deadline(state.request_deadline, proxy.run_matches(&request)).await?;
    for m in &mut items {
        if m.date.is_empty() {
            m.date = today.clone();
        }
    }

    let count = items.len();
    info!(count, date = %today, "Live scrape complete");
    Ok(respond(
        json!({ "ok": true, "items": items, "count": count, "date": today }),
        "public, max-age=60",
    ))
}

/// GET /api/flashscore/matches — today's matches for the top-5 set,
/// used by the frontend auto-refresh engine.
pub async fn matches(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ProxyError> {
    let proxy = scraper(&state)?;
    let today = Utc::now().date_naive().to_string();

    let request = JobRequest::matches(default_leagues(), &today, &today);
    let mut items = with_deadline(state.request_deadline, proxy.run_matches(&request)).await?;
    for m in &mut items {
        if m.date.is_empty() {
            m.date = today.clone();
        }
    }

    let count = items.len();
    Ok(respond(
        json!({ "ok": true, "items": items, "count": count, "date": today }),
        "public, max-age=300",
    ))
}

/// POST /api/flashscore/fixtures — upcoming matches, `dateOffset` days
/// ahead, with team form data for the tips engine.
pub async fn fixtures(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ProxyError> {
    let proxy = scraper(&state)?;
    let opts = parse_options(&body);
    let days_ahead = clamp_offset(opts.date_offset, 3);
    let dates = upcoming_dates(Utc::now().date_naive(), days_ahead);
    debug!(days_ahead, "Scanning upcoming fixtures");

    let leagues = opts.leagues.unwrap_or_else(default_leagues);
    let request = JobRequest::matches(leagues, &dates[0], &dates[dates.len() - 1])
        .with_form_data(true);
    let mut items = with_deadline(state.request_deadline, proxy.run_matches(&request)).await?;
    mark_scheduled(&mut items);

    let count = items.len();
    Ok(respond(
        json!({ "ok": true, "items": items, "count": count, "dates": dates }),
        "public, max-age=1800",
    ))
}

/// POST /api/flashscore/history — recent finished matches, `dateOffset`
/// days back (sign-insensitive), today included.
pub async fn history(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ProxyError> {
    let proxy = scraper(&state)?;
    let opts = parse_options(&body);
    let days_back = clamp_offset(opts.date_offset, 1);
    let dates = recent_dates(Utc::now().date_naive(), days_back);
    debug!(days_back, "Scanning recent results");

    let leagues = opts.leagues.unwrap_or_else(default_leagues);
    let request = JobRequest::matches(leagues, &dates[0], &dates[dates.len() - 1]);
    let items = with_deadline(state.request_deadline, proxy.run_matches(&request)).await?;
    let status_filter = opts.status.map(|s| s.to_lowercase());
    let items = finished_results(items, status_filter.as_deref());

    let count = items.len();
    Ok(respond(
        json!({ "ok": true, "items": items, "count": count, "dates": dates }),
        "public, max-age=600",
    ))
}

/// GET /api/flashscore/standings — current league tables for the top-5
/// set, grouped by short league key.
pub async fn standings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ProxyError> {
    let proxy = scraper(&state)?;

    let request = JobRequest::standings(default_leagues());
    let payload = with_deadline(state.request_deadline, proxy.run_raw(&request)).await?;
    let standings = group_standings(&payload);

    Ok(respond(
        json!({ "ok": true, "standings": standings }),
        "public, max-age=3600",
    ))
}

/// GET /api/flashscore/overview — recent results and upcoming fixtures
/// in one response. The two jobs are submitted and awaited concurrently
/// and the aggregate is all-or-nothing: either branch failing fails the
/// request.
pub async fn overview(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ProxyError> {
    let proxy = scraper(&state)?;
    let today = Utc::now().date_naive();
    let recent = recent_dates(today, 1);
    let upcoming = upcoming_dates(today, 3);

    let history_request =
        JobRequest::matches(default_leagues(), &recent[0], &recent[recent.len() - 1]);
    let fixture_request =
        JobRequest::matches(default_leagues(), &upcoming[0], &upcoming[upcoming.len() - 1])
            .with_form_data(true);

    let (results, mut fixtures) = with_deadline(
        state.request_deadline,
        futures_util::future::try_join(
            proxy.run_matches(&history_request),
            proxy.run_matches(&fixture_request),
        ),
    )
    .await?;

    let results = finished_results(results, None);
    mark_scheduled(&mut fixtures);

    let result_count = results.len();
    let fixture_count = fixtures.len();
    info!(result_count, fixture_count, "Overview fan-out complete");
    Ok(respond(
        json!({
            "ok": true,
            "results": results,
            "fixtures": fixtures,
            "result_count": result_count,
            "fixture_count": fixture_count,
        }),
        "public, max-age=300",
    ))
}
