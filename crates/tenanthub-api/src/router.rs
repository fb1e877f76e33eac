//! Route definitions for the TenantHub HTTP API.
//!
//! All routes are mounted under `/api`. Every request passes through the
//! tenant middleware, so handlers and the scoped persistence layer see the
//! resolved tenant without threading it by hand.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(context_routes())
        .merge(membership_routes())
        .merge(subunit_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    // Layers wrap outward: the logging middleware runs inside the tenant
    // scope, CORS answers preflights before anything else.
    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::tenant::resolve_tenant,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Resolved tenant context (no auth required)
fn context_routes() -> Router<AppState> {
    Router::new().route("/context", get(handlers::context::current_context))
}

/// Membership endpoints
fn membership_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/memberships",
            get(handlers::membership::list_memberships)
                .post(handlers::membership::create_membership),
        )
        .route(
            "/memberships/{id}",
            get(handlers::membership::get_membership)
                .patch(handlers::membership::update_membership),
        )
        .route(
            "/memberships/{id}/activate",
            post(handlers::membership::activate_membership),
        )
        .route(
            "/memberships/{id}/active-subunit",
            put(handlers::membership::set_active_subunit),
        )
        .route(
            "/memberships/{id}/disable",
            post(handlers::membership::disable_membership),
        )
}

/// Sub-unit endpoints
fn subunit_routes() -> Router<AppState> {
    Router::new()
        .route("/subunits", get(handlers::subunit::list_subunits))
        .route(
            "/subunits/accessible",
            get(handlers::subunit::accessible_subunits),
        )
}
