//! Membership handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use tenanthub_core::types::MembershipId;

use crate::dto::request::{
    CreateMembershipRequest, SetActiveSubunitRequest, UpdateMembershipRequest,
};
use crate::dto::response::{ApiResponse, MembershipResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/memberships
///
/// Memberships of the organization the request acts as.
pub async fn list_memberships(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<MembershipResponse>>>, ApiError> {
    let memberships = state.membership_service.list_scoped().await?;
    Ok(Json(ApiResponse::ok(
        memberships.into_iter().map(MembershipResponse::from).collect(),
    )))
}

/// GET /api/memberships/{id}
pub async fn get_membership(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MembershipId>,
) -> Result<Json<ApiResponse<MembershipResponse>>, ApiError> {
    let membership = state.membership_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(membership.into())))
}

/// POST /api/memberships
pub async fn create_membership(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateMembershipRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MembershipResponse>>), ApiError> {
    let membership = state
        .membership_service
        .create(&auth, req.into_command()?)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(membership.into()))))
}

/// PATCH /api/memberships/{id}
pub async fn update_membership(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MembershipId>,
    Json(req): Json<UpdateMembershipRequest>,
) -> Result<Json<ApiResponse<MembershipResponse>>, ApiError> {
    let membership = state
        .membership_service
        .update(&auth, id, req.into_command()?)
        .await?;
    Ok(Json(ApiResponse::ok(membership.into())))
}

/// POST /api/memberships/{id}/activate
pub async fn activate_membership(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MembershipId>,
) -> Result<Json<ApiResponse<MembershipResponse>>, ApiError> {
    let membership = state.membership_service.activate(&auth, id).await?;
    Ok(Json(ApiResponse::ok(membership.into())))
}

/// PUT /api/memberships/{id}/active-subunit
pub async fn set_active_subunit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MembershipId>,
    Json(req): Json<SetActiveSubunitRequest>,
) -> Result<Json<ApiResponse<MembershipResponse>>, ApiError> {
    let membership = state
        .membership_service
        .set_active_subunit(&auth, id, req.subunit_id)
        .await?;
    Ok(Json(ApiResponse::ok(membership.into())))
}

/// POST /api/memberships/{id}/disable
pub async fn disable_membership(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MembershipId>,
) -> Result<Json<ApiResponse<MembershipResponse>>, ApiError> {
    let membership = state.membership_service.disable(&auth, id).await?;
    Ok(Json(ApiResponse::ok(membership.into())))
}
