use anyhow::Context;
use dotenvy::dotenv;
use log::info;
use std::sync::Arc;

use touchpoint_dashboard::core::config::AppConfig;
use touchpoint_dashboard::core::shared::utils::{redact_database_url, run_migrations};
use touchpoint_dashboard::core::shared::{create_conn, AppState, SystemClock};
use touchpoint_dashboard::run_axum_server;
use touchpoint_dashboard::store::PgActivityStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Starting {} v{} with database {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        redact_database_url(&config.database_url)
    );

    let pool = create_conn(&config).context("Failed to create database pool")?;

    if config.run_migrations {
        run_migrations(&pool).map_err(|e| anyhow::anyhow!(e))?;
    }

    let app_state = Arc::new(AppState {
        config,
        store: Arc::new(PgActivityStore::new(pool)),
        clock: Arc::new(SystemClock),
    });

    run_axum_server(app_state).await?;
    info!("Server stopped");
    Ok(())
}
