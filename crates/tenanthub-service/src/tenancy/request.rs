//! Per-request tenant resolution: memberships first, then override headers.

use std::sync::Arc;

use tracing::debug;

use tenanthub_core::types::{FederationId, OrganizationId, SubunitId};
use tenanthub_database::TenancyStore;
use tenanthub_entity::TenantContext;
use tenanthub_entity::context::ResolutionSource;
use tenanthub_entity::federation::Federation;
use tenanthub_entity::organization::Organization;
use tenanthub_entity::principal::Principal;

use super::active::{ActiveRelationship, ActiveRelationshipResolver};

/// Raw per-request inputs to tenant resolution.
#[derive(Debug, Clone, Default)]
pub struct RequestSignals {
    /// The authenticated principal, if any.
    pub principal: Option<Principal>,
    /// Raw organization override header value.
    pub organization: Option<String>,
    /// Raw sub-unit override header value.
    pub subunit: Option<String>,
    /// Raw federation override header value.
    pub federation: Option<String>,
}

impl RequestSignals {
    /// Signals for an anonymous request without overrides.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Signals for an authenticated request without overrides.
    pub fn for_principal(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            ..Self::default()
        }
    }

    /// Set the organization override.
    pub fn with_organization(mut self, raw: impl Into<String>) -> Self {
        self.organization = Some(raw.into());
        self
    }

    /// Set the sub-unit override.
    pub fn with_subunit(mut self, raw: impl Into<String>) -> Self {
        self.subunit = Some(raw.into());
        self
    }

    /// Set the federation override.
    pub fn with_federation(mut self, raw: impl Into<String>) -> Self {
        self.federation = Some(raw.into());
        self
    }
}

/// Builds the [`TenantContext`] for one request.
///
/// Never fails: malformed or unauthorized overrides are dropped and the
/// previously resolved state is kept.
#[derive(Clone)]
pub struct RequestContextResolver {
    store: Arc<dyn TenancyStore>,
    active: ActiveRelationshipResolver,
}

impl std::fmt::Debug for RequestContextResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContextResolver").finish()
    }
}

impl RequestContextResolver {
    /// Creates a new request resolver.
    pub fn new(store: Arc<dyn TenancyStore>) -> Self {
        Self {
            active: ActiveRelationshipResolver::new(Arc::clone(&store)),
            store,
        }
    }

    /// Resolve the tenant context for `signals`.
    pub async fn resolve(&self, signals: &RequestSignals) -> TenantContext {
        let mut context = match &signals.principal {
            Some(principal) => TenantContext::for_principal(principal.clone()),
            None => TenantContext::anonymous(),
        };

        if let Some(principal) = &signals.principal {
            if let Some(relationship) = self.active.resolve_organization(principal.id).await {
                self.adopt(&mut context, relationship, ResolutionSource::Membership)
                    .await;
            }
        }

        if let Some(raw) = signals.organization.as_deref() {
            self.apply_organization_override(&mut context, raw, signals.subunit.as_deref())
                .await;
        }

        if let Some(raw) = signals.federation.as_deref() {
            self.apply_federation_override(&mut context, raw).await;
        }

        context
    }

    async fn apply_organization_override(
        &self,
        context: &mut TenantContext,
        raw: &str,
        raw_subunit: Option<&str>,
    ) {
        let Some(principal_id) = context.principal_id() else {
            debug!("Ignoring organization header on anonymous request");
            return;
        };
        let Some(organization_id) = OrganizationId::parse_lenient(raw) else {
            debug!(header = %raw, "Ignoring malformed organization header");
            return;
        };
        let Some(organization) = self.find_organization(organization_id).await else {
            return;
        };

        let membership = self
            .store
            .find_membership_for(principal_id, organization_id)
            .await
            .ok()
            .flatten()
            .filter(|m| m.is_enabled());
        let Some(membership) = membership else {
            debug!(
                principal_id = %principal_id,
                organization_id = %organization_id,
                "Organization header denied: no enabled membership"
            );
            return;
        };

        context.federation = self.federation_of(&organization).await;
        context.subunit = match raw_subunit {
            Some(raw) => self.subunit_in(raw, organization_id).await,
            None => None,
        };
        context.membership = Some(membership);
        context.organization = Some(organization);
        context.source = ResolutionSource::OrganizationHeader;
    }

    async fn apply_federation_override(&self, context: &mut TenantContext, raw: &str) {
        let Some(federation_id) = FederationId::parse_lenient(raw) else {
            debug!(header = %raw, "Ignoring malformed federation header");
            return;
        };
        let Some(federation) = self.store.find_federation(federation_id).await.ok().flatten()
        else {
            debug!(federation_id = %federation_id, "Ignoring unknown federation");
            return;
        };

        let Some(principal) = context.principal.clone() else {
            context.federation = Some(federation);
            context.source = ResolutionSource::FederationHeader;
            return;
        };

        let already_inside = context
            .organization
            .as_ref()
            .is_some_and(|o| o.federation_id == Some(federation_id));

        if self.is_elevated(&principal).await {
            if !already_inside {
                context.clear_organization();
            }
            context.federation = Some(federation);
            context.source = ResolutionSource::FederationHeader;
            return;
        }

        if already_inside {
            context.federation = Some(federation);
            return;
        }

        match self
            .active
            .resolve_organization_within(principal.id, federation_id)
            .await
        {
            Some(relationship) => {
                self.adopt(context, relationship, ResolutionSource::FederationHeader)
                    .await;
            }
            None => debug!(
                principal_id = %principal.id,
                federation_id = %federation_id,
                "Federation header denied: no enabled membership inside it"
            ),
        }
    }

    /// Install a resolved relationship with its sub-unit and federation.
    async fn adopt(
        &self,
        context: &mut TenantContext,
        relationship: ActiveRelationship,
        source: ResolutionSource,
    ) {
        context.subunit = self.active.resolve_subunit(&relationship.membership).await;
        context.federation = self.federation_of(&relationship.organization).await;
        context.membership = Some(relationship.membership);
        context.organization = Some(relationship.organization);
        context.source = source;
    }

    /// Elevated callers: platform superuser or staff, or any enabled
    /// top-level membership.
    async fn is_elevated(&self, principal: &Principal) -> bool {
        if principal.is_platform_elevated() {
            return true;
        }
        self.store
            .memberships_of(principal.id)
            .await
            .map(|all| {
                all.iter()
                    .any(|m| m.is_enabled() && m.effective_role().is_top_level())
            })
            .unwrap_or(false)
    }

    async fn find_organization(&self, id: OrganizationId) -> Option<Organization> {
        let found = self.store.find_organization(id).await.ok().flatten();
        if found.is_none() {
            debug!(organization_id = %id, "Ignoring unknown organization");
        }
        found
    }

    async fn federation_of(&self, organization: &Organization) -> Option<Federation> {
        let federation_id = organization.federation_id?;
        self.store.find_federation(federation_id).await.ok().flatten()
    }

    async fn subunit_in(
        &self,
        raw: &str,
        organization_id: OrganizationId,
    ) -> Option<tenanthub_entity::subunit::Subunit> {
        let subunit_id = SubunitId::parse_lenient(raw)?;
        let subunit = self.store.find_subunit(subunit_id).await.ok().flatten()?;
        if subunit.is_usable() && subunit.organization_id == organization_id {
            Some(subunit)
        } else {
            debug!(
                subunit_id = %subunit_id,
                organization_id = %organization_id,
                "Sub-unit header rejected for adopted organization"
            );
            None
        }
    }
}
