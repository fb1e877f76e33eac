//! Tenant context inspection.

use axum::Json;

use crate::dto::response::{ApiResponse, ContextResponse};
use crate::extractors::Tenant;

/// GET /api/context
///
/// Available to anonymous callers; they simply get an empty context.
pub async fn current_context(tenant: Tenant) -> Json<ApiResponse<ContextResponse>> {
    Json(ApiResponse::ok(ContextResponse::from(&*tenant)))
}
