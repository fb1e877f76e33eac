//! The request-scoped tenant context and its ambient accessor.
//!
//! The HTTP layer resolves a [`TenantContext`] once per request and runs the
//! rest of the request inside [`ambient::scope`]. Anything downstream,
//! including the scoped persistence layer, reads it back with
//! [`ambient::current`]. Leaving the scope drops the context, whether the
//! request future completes, fails, panics or is cancelled.

use serde::Serialize;

use tenanthub_core::types::{FederationId, OrganizationId, PrincipalId, SubunitId};

use crate::federation::Federation;
use crate::membership::Membership;
use crate::organization::Organization;
use crate::principal::Principal;
use crate::subunit::Subunit;

/// Where the organization in a context came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Nothing has been resolved.
    #[default]
    Unset,
    /// Resolved from the principal's memberships.
    Membership,
    /// Adopted from the organization override header.
    OrganizationHeader,
    /// Adopted or narrowed by the federation override header.
    FederationHeader,
}

/// Which tenant the current request acts as. Every field may be absent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TenantContext {
    /// The authenticated principal, if any.
    pub principal: Option<Principal>,
    /// The membership backing `organization`.
    pub membership: Option<Membership>,
    /// The organization being acted as.
    pub organization: Option<Organization>,
    /// The sub-unit being acted in.
    pub subunit: Option<Subunit>,
    /// The federation in effect.
    pub federation: Option<Federation>,
    /// How `organization` was chosen.
    pub source: ResolutionSource,
}

impl TenantContext {
    /// An empty context for an anonymous request.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An empty context for an authenticated request.
    pub fn for_principal(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            ..Self::default()
        }
    }

    /// The authenticated principal's id.
    pub fn principal_id(&self) -> Option<PrincipalId> {
        self.principal.as_ref().map(|p| p.id)
    }

    /// Check whether the request is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// The organization id in effect.
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization.as_ref().map(|o| o.id)
    }

    /// The sub-unit id in effect.
    pub fn subunit_id(&self) -> Option<SubunitId> {
        self.subunit.as_ref().map(|s| s.id)
    }

    /// The federation id in effect.
    pub fn federation_id(&self) -> Option<FederationId> {
        self.federation.as_ref().map(|f| f.id)
    }

    /// Drop the organization, its membership and sub-unit.
    pub fn clear_organization(&mut self) {
        self.membership = None;
        self.organization = None;
        self.subunit = None;
    }
}

/// Ambient access to the current request's [`TenantContext`].
pub mod ambient {
    use std::future::Future;
    use std::sync::Arc;

    use super::TenantContext;

    tokio::task_local! {
        static CURRENT: Arc<TenantContext>;
    }

    /// Run `fut` with `context` installed as the ambient context.
    pub async fn scope<F>(context: impl Into<Arc<TenantContext>>, fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT.scope(context.into(), fut).await
    }

    /// The ambient context, or `None` outside any request scope.
    pub fn current() -> Option<Arc<TenantContext>> {
        CURRENT.try_with(Arc::clone).ok()
    }
}
