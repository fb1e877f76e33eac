//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use tenanthub_entity::ambient;

/// Logs request method, path, status, duration, and the tenant acted as.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let tenant = ambient::current();
    let principal_id = tenant.as_ref().and_then(|c| c.principal_id());
    let organization_id = tenant.as_ref().and_then(|c| c.organization_id());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        principal_id = ?principal_id,
        organization_id = ?organization_id,
        "HTTP request"
    );

    response
}
