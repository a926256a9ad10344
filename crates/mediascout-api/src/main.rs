mod errors;
mod handlers;
mod routes;
mod state;

use crate::state::AppState;
use clap::Parser;
use mediascout_coordinator::{Coordinator, ProviderCredentials, Scheduler};
use mediascout_governor::RateGovernor;
use mediascout_http::HttpClient;
use mediascout_metrics::ScrapeMetrics;
use mediascout_relevance::{HttpScorer, RelevanceScorer};
use mediascout_store::{PgSourceRecipeStore, PgStore};
use mediascout_types::run::Trigger;
use mediascout_types::ScrapingConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mediascout-api")]
#[command(about = "Media monitoring scrape coordinator and HTTP surface")]
struct Args {
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Run a single blocking scrape for this brand id and exit instead of
    /// starting the server and scheduler.
    #[arg(long)]
    once: Option<Uuid>,
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Builds the relevance scorer from environment configuration: the
/// HTTP-backed scorer if a credential is present, otherwise the fail-open
/// no-op so ambiguous matches are always kept.
fn relevance_scorer_from_env() -> Arc<dyn RelevanceScorer> {
    match std::env::var("SCRAPING_RELEVANCE_API_KEY") {
        Ok(api_key) => {
            let endpoint = std::env::var("SCRAPING_RELEVANCE_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
            let model = std::env::var("SCRAPING_RELEVANCE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
            Arc::new(HttpScorer::new(endpoint, api_key, model))
        }
        Err(_) => Arc::new(mediascout_relevance::NullScorer),
    }
}

fn credentials_from_env() -> ProviderCredentials {
    let rss_seed_urls = std::env::var("RSS_SEED_URLS")
        .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    ProviderCredentials {
        news_api_key: std::env::var("GNEWS_API_KEY").ok(),
        search_api_key: std::env::var("SERPAPI_KEY").ok(),
        rss_seed_urls,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Arc::new(ScrapingConfig::from_env());
    tracing::info!(run_budget = ?config.run_budget, "scraping configuration loaded");

    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        tracing::error!("DATABASE_URL is not set");
        anyhow::anyhow!("missing DATABASE_URL")
    })?;
    let pool = Arc::new(
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await?,
    );

    let store = Arc::new(PgStore::new(pool.clone()));
    let recipe_store = Arc::new(PgSourceRecipeStore::new(pool));
    let governor = Arc::new(RateGovernor::new(config.clone()));
    let http = Arc::new(HttpClient::new(config.clone())?);
    let metrics = Arc::new(ScrapeMetrics::new()?);
    let credentials = credentials_from_env();
    let relevance_scorer = relevance_scorer_from_env();

    let coordinator = Arc::new(Coordinator::new(
        store.clone(),
        recipe_store,
        governor,
        http,
        config,
        credentials,
        Some(relevance_scorer),
    ));

    if let Some(brand_id) = args.once {
        tracing::info!(%brand_id, "running a single scrape and exiting");
        let summary = coordinator.run_scrape(brand_id, Trigger::Api).await?;
        tracing::info!(
            run_id = summary.run_id.as_str(),
            accepted_mentions = summary.accepted_mentions,
            "one-shot scrape complete"
        );
        return Ok(());
    }

    let scheduler = Arc::new(Scheduler::new(coordinator.clone(), store.clone()));
    let scheduler_handle = scheduler.clone();
    tokio::spawn(async move {
        scheduler_handle.run_forever().await;
    });

    let app_state = AppState::new(store, coordinator, metrics);
    let app = routes::build(app_state);

    let addr: SocketAddr = args.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(bind_address = %addr, "mediascout-api listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("mediascout-api shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut handler) => {
                handler.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received sigterm, shutting down"),
    }
}
