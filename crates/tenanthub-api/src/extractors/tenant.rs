//! `Tenant` extractor: the tenant context resolved by the tenant middleware.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use tenanthub_entity::TenantContext;

/// The resolved tenant context; anonymous when no middleware set one.
#[derive(Debug, Clone)]
pub struct Tenant(pub Arc<TenantContext>);

impl std::ops::Deref for Tenant {
    type Target = TenantContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Tenant {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<Arc<TenantContext>>()
            .cloned()
            .unwrap_or_else(|| Arc::new(TenantContext::anonymous()));
        Ok(Tenant(context))
    }
}
