use std::sync::Arc;

use crate::config::Config;
use pricewatch_core::{
    Clock, PriceResolver, RecencyCache, SampleStore, SystemClock, TrackingRegistry,
};
use pricewatch_market_data::{KrakenProvider, PriceSource};
use pricewatch_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, SampleRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub registry: Arc<TrackingRegistry>,
    pub resolver: Arc<PriceResolver>,
    pub clock: Arc<dyn Clock>,
}

pub fn init_tracing() {
    let log_format = std::env::var("PW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wires the production state: SQLite store, Kraken source and the system clock.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let source: Arc<dyn PriceSource> = Arc::new(KrakenProvider::new(config.kraken_api_url.clone()));
    build_state_with(config, source, Arc::new(SystemClock)).await
}

/// Wires the state around a given price source and clock.
///
/// Fails if the database cannot be opened or migrated; the server must not
/// serve without its durable store.
pub async fn build_state_with(
    config: &Config,
    source: Arc<dyn PriceSource>,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone())?;

    let store: Arc<dyn SampleStore> = Arc::new(SampleRepository::new(pool, writer));
    let cache = Arc::new(RecencyCache::new(config.cache.clone(), clock.clone()));
    let resolver = Arc::new(PriceResolver::new(store, cache));
    let registry = Arc::new(TrackingRegistry::new(
        source,
        resolver.clone(),
        clock.clone(),
        config.poll_interval,
    ));

    tracing::info!(
        "Price collection every {:?}, cache capped at {} assets",
        config.poll_interval,
        config.cache.max_assets
    );

    Ok(Arc::new(AppState {
        registry,
        resolver,
        clock,
    }))
}

/// Resolves when the process receives Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
