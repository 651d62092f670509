//! Ledgerly API Server
//!
//! Composition root: configuration, tracing, database, rate sources and the
//! engine components are built here and handed to the router.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerly_api::{AppState, create_router};
use ledgerly_core::currency::ExchangeRateResolver;
use ledgerly_core::ledger::TransactionComposer;
use ledgerly_core::tags::TagBalanceAllocator;
use ledgerly_db::{
    ExchangeRateRepository, TagBalanceRepository, TransactionRepository, connect_with_pool,
};
use ledgerly_rates::sources_from_config;
use ledgerly_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerly=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    let sources = sources_from_config(&config.rates)?;
    info!(
        primary = %config.rates.primary_url,
        fallback = %config.rates.fallback_url,
        timeout_secs = config.rates.timeout_secs,
        "Rate sources configured"
    );

    let resolver = Arc::new(ExchangeRateResolver::with_memo(
        Arc::new(ExchangeRateRepository::new(db.clone())),
        sources,
        config.rates.cache_capacity,
        config.rates.cache_ttl_secs,
    ));
    let allocator = TagBalanceAllocator::new(Arc::new(TagBalanceRepository::new(db.clone())));
    let composer = TransactionComposer::new(
        Arc::new(TransactionRepository::new(db)),
        resolver.clone(),
        allocator.clone(),
    )
    .with_allocation_mode(config.ledger.allocation_mode);
    info!(allocation_mode = ?composer.allocation_mode(), "Ledger engine ready");

    let state = AppState {
        composer: Arc::new(composer),
        allocator,
        resolver,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
