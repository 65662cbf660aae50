use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod config;
mod error;
mod scrape;
mod server;

use config::Config;
use scrape::{ApifyPlatform, JobProxy};
use server::passthrough::UpstreamProxy;
use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Build the scrape job proxy when a platform token is configured.
    // Credentials are injected here; nothing reads them from the
    // environment past this point.
    let scraper = match &config.apify_token {
        Some(token) => {
            let platform = ApifyPlatform::new(
                token.clone(),
                &config.apify_actor,
                Some(&config.apify_base_url),
            )?;
            info!(actor = %config.apify_actor, "FlashScore scrape endpoints enabled");
            Some(Arc::new(JobProxy::new(
                Arc::new(platform),
                Duration::from_secs(config.poll_interval_secs),
                config.poll_max_attempts,
                Duration::from_secs(config.sync_timeout_secs),
            )))
        }
        None => {
            warn!("APIFY_TOKEN not set — FlashScore scrape endpoints will answer 500");
            None
        }
    };

    if config.api_football_key.is_none() {
        warn!("API_FOOTBALL_KEY not set — /api/af will answer 500");
    }
    if config.football_data_key.is_none() {
        warn!("FOOTBALL_DATA_KEY not set — /api/football-data will answer 500");
    }

    let state = AppState {
        scraper,
        api_football: Arc::new(UpstreamProxy::api_football(
            config.api_football_key.clone(),
            &config.api_football_url,
        )?),
        football_data: Arc::new(UpstreamProxy::football_data(
            config.football_data_key.clone(),
            &config.football_data_url,
        )?),
        request_deadline: Duration::from_secs(config.request_deadline_secs),
    };

    let app = server::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Proxy listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
