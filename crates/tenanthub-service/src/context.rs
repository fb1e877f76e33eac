//! Request context carrying the authenticated principal and resolved tenant.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tenanthub_core::types::PrincipalId;
use tenanthub_entity::TenantContext;
use tenanthub_entity::principal::Principal;

/// Context for the current authenticated request.
///
/// Built by the HTTP layer and passed into service methods so that every
/// write knows *who* is acting and *as which tenant*.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The acting principal.
    pub principal: Principal,
    /// The tenant resolved for this request.
    pub tenant: Arc<TenantContext>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(principal: Principal, tenant: Arc<TenantContext>) -> Self {
        Self {
            principal,
            tenant,
            request_time: Utc::now(),
        }
    }

    /// Creates a context for calls made outside any request.
    pub fn detached(principal: Principal) -> Self {
        let tenant = Arc::new(TenantContext::for_principal(principal.clone()));
        Self::new(principal, tenant)
    }

    /// The acting principal's id.
    pub fn principal_id(&self) -> PrincipalId {
        self.principal.id
    }

    /// Returns whether the principal is a platform superuser.
    pub fn is_platform_superuser(&self) -> bool {
        self.principal.is_superuser
    }
}
