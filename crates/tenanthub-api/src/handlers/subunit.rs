//! Sub-unit handlers.

use axum::Json;
use axum::extract::State;

use tenanthub_core::error::AppError;

use crate::dto::response::{ApiResponse, SubunitResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/subunits
pub async fn list_subunits(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SubunitResponse>>>, ApiError> {
    let subunits = state.subunit_service.list_scoped().await?;
    Ok(Json(ApiResponse::ok(
        subunits.into_iter().map(SubunitResponse::from).collect(),
    )))
}

/// GET /api/subunits/accessible
///
/// Sub-units the membership behind this request may manage.
pub async fn accessible_subunits(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SubunitResponse>>>, ApiError> {
    let membership = auth
        .tenant
        .membership
        .as_ref()
        .ok_or_else(|| AppError::not_found("No membership backs the current organization"))?;
    let subunits = state.subunit_service.accessible_for(membership).await?;
    Ok(Json(ApiResponse::ok(
        subunits.into_iter().map(SubunitResponse::from).collect(),
    )))
}
