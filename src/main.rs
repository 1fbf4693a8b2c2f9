use anyhow::Context;
use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;

use crmserver::core::config::AppConfig;
use crmserver::core::shared::state::AppState;
use crmserver::core::shared::utils::{create_conn, run_migrations};
use crmserver::main_module::run_axum_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Auto)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    info!(
        "Starting {} v{} on {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.bind_address()
    );

    let pool = create_conn(&config.database).context("Failed to create database pool")?;
    info!(
        "Database pool ready (max {} connections)",
        config.database.max_connections
    );

    let migration_pool = pool.clone();
    tokio::task::spawn_blocking(move || run_migrations(&migration_pool))
        .await
        .context("Migration task panicked")?
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
    info!("Database migrations applied");

    let state = Arc::new(AppState::new(config, pool));
    if let Err(e) = run_axum_server(state).await {
        error!("Server stopped with error: {e}");
        return Err(e).context("HTTP server failed");
    }
    info!("Server stopped");
    Ok(())
}
