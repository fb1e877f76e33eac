//! TenantHub Server: multi-tenant organization membership and tenant
//! resolution service.
//!
//! Loads configuration, initializes tracing and hands over to the API crate.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use tenanthub_core::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("TENANTHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("Failed to load configuration")?;

    init_logging(&config);
    tracing::info!(
        env = %env,
        backend = ?config.database.backend,
        "Starting TenantHub v{}",
        env!("CARGO_PKG_VERSION")
    );

    tenanthub_api::run_server(config)
        .await
        .context("TenantHub server failed")?;
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
