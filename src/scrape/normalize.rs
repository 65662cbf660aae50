//! Field normalization for raw scraper output.
//!
//! The scraper has shipped several field-naming conventions over time
//! (`homeTeam.name` vs `home_team` vs `home`, and so on). Each canonical
//! attribute carries an ordered candidate list; the first present,
//! non-null value wins. The canonical name is always the first candidate,
//! which makes normalization idempotent.

use std::collections::BTreeMap;

use serde_json::Value;

use super::types::{ResultItem, StandingRow};

/// Candidate key paths per canonical match attribute. A dot in a
/// candidate descends into a nested object.
const LEAGUE: &[&str] = &["league", "tournament.name", "tournament"];
const HOME_TEAM: &[&str] = &["home_team", "homeTeam.name", "homeTeam", "home"];
const AWAY_TEAM: &[&str] = &["away_team", "awayTeam.name", "awayTeam", "away"];
const HOME_SCORE: &[&str] = &["home_score", "homeScore"];
const AWAY_SCORE: &[&str] = &["away_score", "awayScore"];
const STATUS: &[&str] = &["status", "matchStatus"];
const TIME: &[&str] = &["time", "startTime"];
const DATE: &[&str] = &["date", "startTime"];
const HOME_FORM: &[&str] = &["home_form", "homeTeam.form"];
const AWAY_FORM: &[&str] = &["away_form", "awayTeam.form"];
const HOME_GOALS_AVG: &[&str] = &["home_goals_avg", "homeTeam.goalsAvg"];
const AWAY_GOALS_AVG: &[&str] = &["away_goals_avg", "awayTeam.goalsAvg"];

/// Candidates per standing-row attribute.
const POS: &[&str] = &["pos", "position", "rank"];
const TEAM: &[&str] = &["team", "teamName"];
const PLAYED: &[&str] = &["p", "played", "matches"];
const WINS: &[&str] = &["w", "wins", "won"];
const DRAWS: &[&str] = &["d", "draws", "drawn"];
const LOSSES: &[&str] = &["l", "losses", "lost"];
const GOALS_FOR: &[&str] = &["gf", "goalsFor", "scored"];
const GOALS_AGAINST: &[&str] = &["ga", "goalsAgainst", "conceded"];
const GOAL_DIFF: &[&str] = &["gd", "goalDifference"];
const POINTS: &[&str] = &["pts", "points"];
const FORM: &[&str] = &["form"];

/// League identifiers the standings endpoint serves, with the short key
/// the frontend groups by.
pub const LEAGUE_KEYS: &[(&str, &str)] = &[
    ("england_premier-league", "pl"),
    ("spain_laliga", "laliga"),
    ("italy_serie-a", "seriea"),
    ("germany_bundesliga", "bundesliga"),
    ("france_ligue-1", "ligue1"),
];

/// Resolve the first present, non-null value among the candidate paths.
fn lookup<'a>(item: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    'candidates: for path in candidates {
        let mut cur = item;
        for seg in path.split('.') {
            match cur.get(seg) {
                Some(v) => cur = v,
                None => continue 'candidates,
            }
        }
        if !cur.is_null() {
            return Some(cur);
        }
    }
    None
}

fn text(item: &Value, candidates: &[&str]) -> String {
    match lookup(item, candidates) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Scores stay nullable: an unplayed match has no score, and `0` would
/// be indistinguishable from a real scoreline.
fn score(item: &Value, candidates: &[&str]) -> Option<i64> {
    match lookup(item, candidates)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn int(item: &Value, candidates: &[&str]) -> i64 {
    score(item, candidates).unwrap_or(0)
}

fn float(item: &Value, candidates: &[&str]) -> f64 {
    match lookup(item, candidates) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn form(item: &Value, candidates: &[&str]) -> Vec<String> {
    match lookup(item, candidates) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalize one raw record. Never fails: missing or malformed fields
/// default to empty/zero/null.
pub fn normalize_match(item: &Value) -> ResultItem {
    ResultItem {
        home_team: text(item, HOME_TEAM),
        away_team: text(item, AWAY_TEAM),
        league: text(item, LEAGUE),
        date: text(item, DATE),
        time: text(item, TIME),
        status: text(item, STATUS),
        home_score: score(item, HOME_SCORE),
        away_score: score(item, AWAY_SCORE),
        home_form: form(item, HOME_FORM),
        away_form: form(item, AWAY_FORM),
        home_goals_avg: float(item, HOME_GOALS_AVG),
        away_goals_avg: float(item, AWAY_GOALS_AVG),
    }
}

/// Normalize a whole dataset payload. A payload that is not a JSON
/// array yields an empty vec, not an error.
pub fn normalize_matches(payload: &Value) -> Vec<ResultItem> {
    match payload.as_array() {
        Some(items) => items.iter().map(normalize_match).collect(),
        None => Vec::new(),
    }
}

pub fn normalize_standing(item: &Value) -> StandingRow {
    StandingRow {
        pos: int(item, POS),
        team: text(item, TEAM),
        p: int(item, PLAYED),
        w: int(item, WINS),
        d: int(item, DRAWS),
        l: int(item, LOSSES),
        gf: int(item, GOALS_FOR),
        ga: int(item, GOALS_AGAINST),
        gd: int(item, GOAL_DIFF),
        pts: int(item, POINTS),
        form: text(item, FORM),
    }
}

/// Group raw standing rows by league key, sorted by table position.
/// Rows are matched to a league by substring on the scraped league name,
/// since the scraper reports it in several formats.
pub fn group_standings(payload: &Value) -> BTreeMap<&'static str, Vec<StandingRow>> {
    let items: &[Value] = match payload.as_array() {
        Some(a) => a,
        None => &[],
    };

    let mut grouped = BTreeMap::new();
    for (league_id, key) in LEAGUE_KEYS {
        let needle = league_id.split('_').nth(1).unwrap_or(league_id);
        let mut rows: Vec<StandingRow> = items
            .iter()
            .filter(|item| {
                let league = text(item, LEAGUE).to_lowercase();
                league.contains(needle) || league.contains(key)
            })
            .map(normalize_standing)
            .collect();
        rows.sort_by_key(|r| r.pos);
        grouped.insert(*key, rows);
    }
    grouped
}

/// Finished-match statuses as the scraper reports them (lowercased).
pub fn is_finished(status: &str) -> bool {
    matches!(status, "ft" | "finished" | "aet" | "pen")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_nested_team_name_wins_over_plain() {
        let item = json!({
            "homeTeam": { "name": "Arsenal", "form": ["W", "W", "D"] },
            "awayTeam": { "name": "Chelsea" },
            "status": "scheduled"
        });
        let m = normalize_match(&item);
        assert_eq!(m.home_team, "Arsenal");
        assert_eq!(m.away_team, "Chelsea");
        assert_eq!(m.status, "scheduled");
        assert_eq!(m.home_score, None);
        assert_eq!(m.away_score, None);
        assert_eq!(m.home_form, vec!["W", "W", "D"]);
    }

    #[test]
    fn test_canonical_name_takes_priority() {
        let item = json!({
            "home_team": "Sunderland",
            "homeTeam": { "name": "Should Not Win" },
            "home": "Nor This"
        });
        assert_eq!(normalize_match(&item).home_team, "Sunderland");
    }

    #[test]
    fn test_last_resort_candidate() {
        let item = json!({ "home": "Leeds", "away": "Burnley" });
        let m = normalize_match(&item);
        assert_eq!(m.home_team, "Leeds");
        assert_eq!(m.away_team, "Burnley");
    }

    #[test]
    fn test_null_candidate_is_skipped() {
        let item = json!({ "home_team": null, "homeTeam": { "name": "Everton" } });
        assert_eq!(normalize_match(&item).home_team, "Everton");
    }

    #[test]
    fn test_score_from_numeric_string() {
        let item = json!({ "homeScore": "2", "awayScore": 1 });
        let m = normalize_match(&item);
        assert_eq!(m.home_score, Some(2));
        assert_eq!(m.away_score, Some(1));
    }

    #[test]
    fn test_garbage_score_defaults_to_null() {
        let item = json!({ "homeScore": "postponed", "awayScore": {} });
        let m = normalize_match(&item);
        assert_eq!(m.home_score, None);
        assert_eq!(m.away_score, None);
    }

    #[test]
    fn test_goals_avg_fallback() {
        let item = json!({
            "homeTeam": { "name": "Inter", "goalsAvg": 2.3 },
            "awayTeam": { "name": "Milan", "goalsAvg": "1.1" }
        });
        let m = normalize_match(&item);
        assert_relative_eq!(m.home_goals_avg, 2.3);
        assert_relative_eq!(m.away_goals_avg, 1.1);
    }

    #[test]
    fn test_start_time_feeds_date_and_time() {
        let item = json!({ "startTime": "2026-08-09T15:00:00Z" });
        let m = normalize_match(&item);
        assert_eq!(m.date, "2026-08-09T15:00:00Z");
        assert_eq!(m.time, "2026-08-09T15:00:00Z");
    }

    #[test]
    fn test_non_array_payload_yields_empty() {
        assert!(normalize_matches(&json!({ "error": "rate limited" })).is_empty());
        assert!(normalize_matches(&json!("oops")).is_empty());
        assert!(normalize_matches(&json!(null)).is_empty());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = json!({
            "homeTeam": { "name": "Arsenal", "form": ["W"], "goalsAvg": 2.0 },
            "awayTeam": { "name": "Chelsea" },
            "homeScore": "3",
            "status": "ft",
            "startTime": "2026-08-02T17:30:00Z",
            "tournament": { "name": "Premier League" }
        });
        let once = normalize_match(&raw);
        let round_tripped = serde_json::to_value(&once).unwrap();
        let twice = normalize_match(&round_tripped);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_scheduled_match_keeps_null_scores() {
        let payload = json!([{
            "homeTeam": { "name": "Arsenal" },
            "awayTeam": { "name": "Chelsea" },
            "status": "scheduled"
        }]);
        let items = normalize_matches(&payload);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].home_team, "Arsenal");
        assert_eq!(items[0].away_team, "Chelsea");
        assert_eq!(items[0].status, "scheduled");
        assert_eq!(items[0].home_score, None);
        assert_eq!(items[0].away_score, None);
    }

    #[test]
    fn test_standing_row_fallbacks() {
        let item = json!({
            "position": 1, "teamName": "Arsenal", "played": 38,
            "won": 28, "drawn": 6, "lost": 4,
            "goalsFor": 88, "goalsAgainst": 29, "goalDifference": 59,
            "points": 90, "form": "WWWDW",
            "league": "Premier League"
        });
        let row = normalize_standing(&item);
        assert_eq!(row.pos, 1);
        assert_eq!(row.team, "Arsenal");
        assert_eq!(row.p, 38);
        assert_eq!(row.w, 28);
        assert_eq!(row.gd, 59);
        assert_eq!(row.pts, 90);
        assert_eq!(row.form, "WWWDW");
    }

    #[test]
    fn test_group_standings_by_league_sorted() {
        let payload = json!([
            { "league": "england_premier-league", "pos": 2, "team": "City", "pts": 85 },
            { "league": "england_premier-league", "pos": 1, "team": "Arsenal", "pts": 90 },
            { "league": "LaLiga Santander", "pos": 1, "team": "Real Madrid", "pts": 92 }
        ]);
        let grouped = group_standings(&payload);
        let pl = &grouped["pl"];
        assert_eq!(pl.len(), 2);
        assert_eq!(pl[0].team, "Arsenal");
        assert_eq!(pl[1].team, "City");
        assert_eq!(grouped["laliga"][0].team, "Real Madrid");
        assert!(grouped["seriea"].is_empty());
    }

    #[test]
    fn test_group_standings_non_array() {
        let grouped = group_standings(&json!({ "oops": true }));
        assert!(grouped.values().all(|rows| rows.is_empty()));
    }

    #[test]
    fn test_is_finished() {
        assert!(is_finished("ft"));
        assert!(is_finished("aet"));
        assert!(is_finished("pen"));
        assert!(is_finished("finished"));
        assert!(!is_finished("scheduled"));
        assert!(!is_finished("live"));
    }
}
