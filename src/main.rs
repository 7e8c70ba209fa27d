//! HTTP server entry point.
//!
//! Wires Postgres-backed stores, the mock mint gateway, and the router
//! together, then serves until interrupted.

use nft_event_service::api::build_router;
use nft_event_service::auth::JwtKeys;
use nft_event_service::solana::MockMintGateway;
use nft_event_service::store::{
    PostgresEventStore, PostgresMintRecordStore, PostgresTemplateStore, run_migrations,
};
use nft_event_service::{AppState, Config};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nft_event_service=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        database_url = %config.database.url,
        bind_addr = %config.server.bind_addr(),
        "Configuration loaded"
    );

    info!("Connecting to Postgres...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(config.database.connect_timeout())
        .connect(&config.database.url)
        .await?;

    info!("Running migrations...");
    run_migrations(&pool).await?;

    let state = AppState::new(
        Arc::new(PostgresEventStore::new(pool.clone())),
        Arc::new(PostgresTemplateStore::new(pool.clone())),
        Arc::new(PostgresMintRecordStore::new(pool)),
        MockMintGateway::shared(),
        Arc::new(JwtKeys::from_secret(&config.auth.jwt_secret)),
        config.server.public_base_url.clone(),
    );

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr()).await?;
    info!(address = %config.server.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    info!("Shutdown signal received");
}
