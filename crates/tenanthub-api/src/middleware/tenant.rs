//! Tenant resolution middleware.
//!
//! Runs once per request: authenticates the bearer token if present, reads
//! the override headers, resolves a [`TenantContext`] and runs the rest of
//! the request inside [`ambient::scope`]. The context is also stored as a
//! request extension for the extractors.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use tenanthub_entity::principal::Principal;
use tenanthub_entity::{TenantContext, ambient};
use tenanthub_service::RequestSignals;

use crate::extractors::auth::bearer_token;
use crate::state::AppState;

/// Resolve the tenant for this request and install it for downstream code.
///
/// Never rejects: an invalid token makes the request anonymous and unusable
/// overrides are dropped by the resolver.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = authenticate(&state, request.headers());
    let signals = collect_signals(&state, request.headers(), principal);

    let context: Arc<TenantContext> = Arc::new(state.context_resolver.resolve(&signals).await);
    debug!(
        principal_id = ?context.principal_id(),
        organization_id = ?context.organization_id(),
        subunit_id = ?context.subunit_id(),
        federation_id = ?context.federation_id(),
        source = ?context.source,
        "Resolved tenant context"
    );

    request.extensions_mut().insert(Arc::clone(&context));
    ambient::scope(context, next.run(request)).await
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<Principal> {
    let token = bearer_token(headers)?;
    match state.jwt_decoder.decode(&token) {
        Ok(claims) => Some(claims.principal()),
        Err(e) => {
            debug!(error = %e, "Treating request with unusable bearer token as anonymous");
            None
        }
    }
}

fn collect_signals(
    state: &AppState,
    headers: &HeaderMap,
    principal: Option<Principal>,
) -> RequestSignals {
    let names = &state.config.tenancy;
    let mut signals = match principal {
        Some(principal) => RequestSignals::for_principal(principal),
        None => RequestSignals::anonymous(),
    };

    if let Some(raw) = header_str(headers, &names.organization_header) {
        signals = signals.with_organization(raw);
    }
    if let Some(raw) = header_str(headers, &names.subunit_header) {
        signals = signals.with_subunit(raw);
    }
    if let Some(raw) = header_str(headers, &names.federation_header) {
        signals = signals.with_federation(raw);
    }
    signals
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
