use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

mod api;
mod config;
mod pubg;
mod scoreboard;

use api::AppState;
use config::Config;
use pubg::{PubgClient, StatsApi};
use scoreboard::{id_cache::load_id_file, ScoreboardService};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if dotenv.is_err() {
        info!("No .env file found, using process environment");
    }

    let config = Config::parse();
    config.validate()?;

    let roster = config.roster_names();
    info!(
        "Tracking {} players since {} (cache {:?})",
        roster.len(),
        config.min_date.to_rfc3339(),
        config.cache_duration
    );

    let client = PubgClient::new(
        &config.pubg_api_url,
        config.api_key(),
        config.request_timeout(),
        config.retry_policy(),
    )?;
    let api: Arc<dyn StatsApi> = Arc::new(client);

    let service = ScoreboardService::new(
        api,
        roster,
        config.cache_duration,
        config.fetch_concurrency,
    );

    if let Some(path) = &config.player_id_file {
        match load_id_file(path).await {
            Ok(ids) => {
                info!("Loaded {} player ids from {}", ids.len(), path.display());
                service.ids().seed(ids).await;
            }
            Err(e) => warn!("Ignoring player id file: {:#}", e),
        }
    }

    if config.warmup {
        info!("Warming up player id cache...");
        let resolved = service.warmup().await;
        info!(
            "Player id cache warm: {}/{} roster members resolved, {} ids cached",
            resolved,
            service.roster().len(),
            service.ids().len().await
        );
    }

    let state = AppState {
        scoreboard: Arc::new(service),
        min_date: config.min_date,
    };
    let app = api::router(state);
    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Scoreboard listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
