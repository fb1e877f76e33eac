//! Application builder: wires the store, state and router into a server.

use axum::Router;
use tracing::{error, info, warn};

use tenanthub_core::config::{AppConfig, StoreBackend};
use tenanthub_core::error::{AppError, ErrorKind};
use tenanthub_database::{DatabasePool, MemoryTenancyStore, PgTenancyStore};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the TenantHub server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    let addr = config.server.bind_address();

    let (state, pool) = match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            let store = PgTenancyStore::new(&pool);
            (AppState::postgres(config, store), Some(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory tenancy store; data is lost on shutdown");
            (AppState::memory(config, MemoryTenancyStore::new()), None)
        }
    };

    info!(
        scoped_entities = ?state.registry.entities(),
        "Tenant scoping registry ready"
    );

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;

    info!("TenantHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    if let Some(pool) = pool {
        pool.close().await;
    }

    info!("TenantHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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
    info!("Shutdown signal received, starting graceful shutdown...");
}
