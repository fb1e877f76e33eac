//! `AuthUser` extractor: the authenticated principal plus the tenant the
//! request resolved to.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use tenanthub_core::error::AppError;
use tenanthub_entity::TenantContext;
use tenanthub_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(tenant) = parts.extensions.get::<Arc<TenantContext>>() {
            let principal = tenant
                .principal
                .clone()
                .ok_or_else(|| AppError::authentication("Authentication required"))?;
            return Ok(AuthUser(RequestContext::new(principal, Arc::clone(tenant))));
        }

        // Routes mounted without the tenant middleware still authenticate.
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;
        let claims = state.jwt_decoder.decode(&token)?;
        Ok(AuthUser(RequestContext::detached(claims.principal())))
    }
}

/// The bearer token of an `Authorization` header, if well formed.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}
