//! Turning a tenant context into a row filter.

use tenanthub_core::types::{FederationId, OrganizationId};
use tenanthub_entity::TenantContext;
use tenanthub_entity::ambient;

/// The tenant restriction applied to a scoped read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    /// No tenant restriction. Only produced when there is no context at
    /// all, i.e. outside a request (background jobs scope explicitly).
    Unscoped,
    /// Rows owned by exactly this organization.
    Organization(OrganizationId),
    /// Rows owned by any organization under this federation.
    Federation(FederationId),
    /// A context exists but names no tenant: nothing is visible.
    Nothing,
}

impl ScopeFilter {
    /// Derive the filter for an optional context.
    ///
    /// Organization wins over federation. A context that resolved neither
    /// yields [`ScopeFilter::Nothing`], never [`ScopeFilter::Unscoped`].
    pub fn from_context(context: Option<&TenantContext>) -> Self {
        let Some(context) = context else {
            return Self::Unscoped;
        };
        if let Some(organization_id) = context.organization_id() {
            Self::Organization(organization_id)
        } else if let Some(federation_id) = context.federation_id() {
            Self::Federation(federation_id)
        } else {
            Self::Nothing
        }
    }

    /// Derive the filter from the ambient request context.
    pub fn from_ambient() -> Self {
        let current = ambient::current();
        Self::from_context(current.as_deref())
    }

    /// Check whether a row owned by `organization_id` (under
    /// `federation_id`) passes the filter.
    pub fn admits(
        &self,
        organization_id: OrganizationId,
        federation_id: Option<FederationId>,
    ) -> bool {
        match self {
            Self::Unscoped => true,
            Self::Organization(id) => *id == organization_id,
            Self::Federation(id) => federation_id == Some(*id),
            Self::Nothing => false,
        }
    }

    /// Check whether the filter can match anything at all.
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}
