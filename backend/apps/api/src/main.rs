//! API Server Entry Point
//!
//! Composition root: owns the rate limiters, the recommendation cache and
//! its sweeper, and hands them to the routers.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod app;
mod config;

use platform::clock::system_clock;
use recommendation::{
    AffinityTableSource, RecommendationAppState, RecommendationCache, spawn_cache_sweeper,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{Gates, build_router};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,platform=info,recommendation=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let clock = system_clock();

    // Recommendation source: affinity table if configured, otherwise empty
    let source = match &config.recommendation_seed_path {
        Some(path) => AffinityTableSource::load(path).await?,
        None => {
            tracing::warn!("RECOMMENDATION_SEED_PATH not set, serving empty recommendations");
            AffinityTableSource::default()
        }
    };

    let cache = Arc::new(RecommendationCache::new(
        config.recommendation.cache_ttl,
        clock.clone(),
    ));
    let sweeper = spawn_cache_sweeper(cache.clone(), config.recommendation.sweep_interval);

    tracing::info!(
        ttl_secs = config.recommendation.cache_ttl.as_secs(),
        sweep_secs = config.recommendation.sweep_interval.as_secs(),
        "Recommendation cache ready"
    );

    let state = RecommendationAppState {
        source: Arc::new(source),
        cache,
        config: Arc::new(config.recommendation.clone()),
    };
    let gates = Gates::new(clock, config.rate_limit_sweep_every);
    let app = build_router(state, gates, &config.frontend_origins);

    // Start server
    tracing::info!("Listening on {}", config.addr);

    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
