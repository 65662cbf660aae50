use serde::{Deserialize, Serialize};

/// Specification of a single scrape job. Immutable once submitted;
/// serializes directly into the actor input the platform expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub sport: String,
    pub leagues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    /// Actor-side job kind, e.g. "standings". Absent means match scraping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_type: Option<String>,
    pub max_items: u32,
    pub include_form_data: bool,
}

impl JobRequest {
    /// Match-scraping job over an inclusive date range.
    pub fn matches(leagues: Vec<String>, date_from: &str, date_to: &str) -> Self {
        JobRequest {
            sport: "football".into(),
            leagues,
            date_from: Some(date_from.to_string()),
            date_to: Some(date_to.to_string()),
            scrape_type: None,
            max_items: 100,
            include_form_data: false,
        }
    }

    /// Standings job: no date range, larger item cap.
    pub fn standings(leagues: Vec<String>) -> Self {
        JobRequest {
            sport: "football".into(),
            leagues,
            date_from: None,
            date_to: None,
            scrape_type: Some("standings".into()),
            max_items: 200,
            include_form_data: false,
        }
    }

    pub fn with_form_data(mut self, include: bool) -> Self {
        self.include_form_data = include;
        self
    }

    pub fn with_max_items(mut self, max_items: u32) -> Self {
        self.max_items = max_items;
        self
    }
}

/// Identifiers returned by job submission. Opaque to callers.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub run_id: String,
    pub dataset_id: String,
}

/// Lifecycle state of a submitted job. Terminal states are final:
/// once one is observed, no further polling happens for that handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Aborted,
    TimedOut,
}

impl JobStatus {
    /// Map the platform's status string. Transitional states
    /// (`TIMING-OUT`, `ABORTING`) and anything unrecognized count as
    /// still running so the poll loop keeps going until its bound.
    pub fn from_platform(s: &str) -> Self {
        match s {
            "READY" => JobStatus::Pending,
            "SUCCEEDED" => JobStatus::Succeeded,
            "FAILED" => JobStatus::Failed,
            "ABORTED" => JobStatus::Aborted,
            "TIMED-OUT" => JobStatus::TimedOut,
            _ => JobStatus::Running,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Aborted | JobStatus::TimedOut
        )
    }
}

/// A normalized match record: one canonical shape reconciled from the
/// several field-naming conventions the scraper has used across versions.
/// Missing upstream fields default instead of failing the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub date: String,
    pub time: String,
    pub status: String,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    #[serde(default)]
    pub home_form: Vec<String>,
    #[serde(default)]
    pub away_form: Vec<String>,
    #[serde(default)]
    pub home_goals_avg: f64,
    #[serde(default)]
    pub away_goals_avg: f64,
}

/// One row of a league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    pub pos: i64,
    pub team: String,
    pub p: i64,
    pub w: i64,
    pub d: i64,
    pub l: i64,
    pub gf: i64,
    pub ga: i64,
    pub gd: i64,
    pub pts: i64,
    pub form: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_platform() {
        assert_eq!(JobStatus::from_platform("READY"), JobStatus::Pending);
        assert_eq!(JobStatus::from_platform("RUNNING"), JobStatus::Running);
        assert_eq!(JobStatus::from_platform("SUCCEEDED"), JobStatus::Succeeded);
        assert_eq!(JobStatus::from_platform("FAILED"), JobStatus::Failed);
        assert_eq!(JobStatus::from_platform("ABORTED"), JobStatus::Aborted);
        assert_eq!(JobStatus::from_platform("TIMED-OUT"), JobStatus::TimedOut);
    }

    #[test]
    fn test_unknown_status_keeps_polling() {
        assert_eq!(JobStatus::from_platform("TIMING-OUT"), JobStatus::Running);
        assert_eq!(JobStatus::from_platform("ABORTING"), JobStatus::Running);
        assert_eq!(JobStatus::from_platform("SOMETHING-NEW"), JobStatus::Running);
        assert!(!JobStatus::from_platform("TIMING-OUT").is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Aborted.is_terminal());
        assert!(JobStatus::TimedOut.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn test_job_request_serializes_camel_case() {
        let req = JobRequest::matches(
            vec!["england_premier-league".into()],
            "2026-08-01",
            "2026-08-03",
        )
        .with_form_data(true);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["sport"], "football");
        assert_eq!(value["dateFrom"], "2026-08-01");
        assert_eq!(value["dateTo"], "2026-08-03");
        assert_eq!(value["maxItems"], 100);
        assert_eq!(value["includeFormData"], true);
        assert!(value.get("scrapeType").is_none());
    }

    #[test]
    fn test_standings_request_has_no_dates() {
        let req = JobRequest::standings(vec!["spain_laliga".into()]);
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("dateFrom").is_none());
        assert_eq!(value["scrapeType"], "standings");
        assert_eq!(value["maxItems"], 200);
    }
}
