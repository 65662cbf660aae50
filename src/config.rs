use clap::Parser;

/// Sports-data proxy: FlashScore scrape jobs plus API passthrough
#[derive(Parser, Debug, Clone)]
#[command(name = "matchday-proxy", version, about)]
pub struct Config {
    /// Listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Apify API token (FlashScore scrape endpoints return 500 without it)
    #[arg(long, env = "APIFY_TOKEN")]
    pub apify_token: Option<String>,

    /// Apify actor that scrapes FlashScore
    #[arg(long, env = "APIFY_ACTOR", default_value = "junglee~flashscore-scraper")]
    pub apify_actor: String,

    /// Apify API base URL
    #[arg(long, env = "APIFY_BASE_URL", default_value = "https://api.apify.com/v2")]
    pub apify_base_url: String,

    /// API-Football (api-sports.io) key
    #[arg(long, env = "API_FOOTBALL_KEY")]
    pub api_football_key: Option<String>,

    /// API-Football base URL
    #[arg(
        long,
        env = "API_FOOTBALL_URL",
        default_value = "https://v3.football.api-sports.io"
    )]
    pub api_football_url: String,

    /// football-data.org key
    #[arg(long, env = "FOOTBALL_DATA_KEY")]
    pub football_data_key: Option<String>,

    /// football-data.org base URL
    #[arg(
        long,
        env = "FOOTBALL_DATA_URL",
        default_value = "https://api.football-data.org/v4"
    )]
    pub football_data_url: String,

    /// Seconds between job status polls
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "5")]
    pub poll_interval_secs: u64,

    /// Poll attempts before giving up on a run
    #[arg(long, env = "POLL_MAX_ATTEMPTS", default_value = "12")]
    pub poll_max_attempts: u32,

    /// Bound for the platform's synchronous run call, seconds
    #[arg(long, env = "SYNC_TIMEOUT_SECS", default_value = "60")]
    pub sync_timeout_secs: u64,

    /// Overall deadline per scrape request, seconds
    #[arg(long, env = "REQUEST_DEADLINE_SECS", default_value = "150")]
    pub request_deadline_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be at least 1");
        }
        if !(1..=300).contains(&self.sync_timeout_secs) {
            anyhow::bail!("sync_timeout_secs must be between 1 and 300");
        }
        if self.request_deadline_secs <= self.sync_timeout_secs {
            anyhow::bail!(
                "request_deadline_secs must exceed sync_timeout_secs or the synchronous path can never complete"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config::parse_from(["matchday-proxy"])
    }

    #[test]
    fn test_defaults_validate() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut cfg = base();
        cfg.poll_interval_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_deadline_must_exceed_sync_timeout() {
        let mut cfg = base();
        cfg.request_deadline_secs = cfg.sync_timeout_secs;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_sync_timeout_bounds() {
        let mut cfg = base();
        cfg.sync_timeout_secs = 0;
        assert!(cfg.validate().is_err());
        cfg.sync_timeout_secs = 301;
        assert!(cfg.validate().is_err());
    }
}
