//! Picks the organization and sub-unit a principal is currently acting as.

use std::sync::Arc;

use tracing::{debug, error, warn};

use tenanthub_core::error::ErrorKind;
use tenanthub_core::result::AppResult;
use tenanthub_core::types::{FederationId, PrincipalId};
use tenanthub_database::TenancyStore;
use tenanthub_entity::membership::Membership;
use tenanthub_entity::organization::Organization;
use tenanthub_entity::subunit::Subunit;

/// A membership together with the organization it grants.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRelationship {
    /// The chosen membership.
    pub membership: Membership,
    /// Its organization.
    pub organization: Organization,
}

/// Resolves a principal's active organization and sub-unit.
///
/// Resolution is best effort: lookup failures are logged and reported as
/// "nothing resolved", never returned to the caller. The only writes are
/// flagging a membership active and caching its active sub-unit.
#[derive(Clone)]
pub struct ActiveRelationshipResolver {
    store: Arc<dyn TenancyStore>,
}

impl std::fmt::Debug for ActiveRelationshipResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRelationshipResolver").finish()
    }
}

impl ActiveRelationshipResolver {
    /// Creates a new resolver.
    pub fn new(store: Arc<dyn TenancyStore>) -> Self {
        Self { store }
    }

    /// Resolve the organization `principal_id` acts as.
    ///
    /// 1. the membership flagged active;
    /// 2. else the first organization-admin membership, which is flagged
    ///    active on the way out;
    /// 3. else the first enabled membership.
    pub async fn resolve_organization(
        &self,
        principal_id: PrincipalId,
    ) -> Option<ActiveRelationship> {
        degrade(
            self.try_resolve_organization(principal_id).await,
            "active organization",
        )
    }

    /// Resolve the principal's organization among those under
    /// `federation_id`, with the same preference order but without flagging
    /// anything active.
    pub async fn resolve_organization_within(
        &self,
        principal_id: PrincipalId,
        federation_id: FederationId,
    ) -> Option<ActiveRelationship> {
        degrade(
            self.try_resolve_within(principal_id, federation_id).await,
            "organization within federation",
        )
    }

    /// Resolve the sub-unit `membership` acts in.
    ///
    /// 1. the cached active sub-unit, if still usable;
    /// 2. else the organization's main sub-unit, if usable;
    /// 3. else its first usable sub-unit by (main desc, id asc).
    ///
    /// A fallback pick is cached on the membership.
    pub async fn resolve_subunit(&self, membership: &Membership) -> Option<Subunit> {
        degrade(self.try_resolve_subunit(membership).await, "active sub-unit")
    }

    async fn try_resolve_organization(
        &self,
        principal_id: PrincipalId,
    ) -> AppResult<Option<ActiveRelationship>> {
        let memberships: Vec<Membership> = self
            .store
            .memberships_of(principal_id)
            .await?
            .into_iter()
            .filter(Membership::is_enabled)
            .collect();

        if let Some(flagged) = memberships.iter().find(|m| m.is_active) {
            if let Some(found) = self.with_organization(flagged.clone()).await? {
                return Ok(Some(found));
            }
        }

        if let Some(admin) = memberships
            .iter()
            .find(|m| m.effective_role().is_organization_admin())
        {
            let activated = self.store.activate_membership(admin.id).await?;
            debug!(
                principal_id = %principal_id,
                membership_id = %activated.id,
                "Flagged organization-admin membership as active"
            );
            if let Some(found) = self.with_organization(activated).await? {
                return Ok(Some(found));
            }
        }

        for membership in memberships {
            if let Some(found) = self.with_organization(membership).await? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    async fn try_resolve_within(
        &self,
        principal_id: PrincipalId,
        federation_id: FederationId,
    ) -> AppResult<Option<ActiveRelationship>> {
        let mut candidates = Vec::new();
        for membership in self.store.memberships_of(principal_id).await? {
            if !membership.is_enabled() {
                continue;
            }
            if let Some(found) = self.with_organization(membership).await? {
                if found.organization.federation_id == Some(federation_id) {
                    candidates.push(found);
                }
            }
        }

        let preferred = candidates
            .iter()
            .position(|c| c.membership.is_active)
            .or_else(|| {
                candidates
                    .iter()
                    .position(|c| c.membership.effective_role().is_organization_admin())
            })
            .unwrap_or(0);

        if preferred < candidates.len() {
            Ok(Some(candidates.swap_remove(preferred)))
        } else {
            Ok(None)
        }
    }

    async fn try_resolve_subunit(&self, membership: &Membership) -> AppResult<Option<Subunit>> {
        if let Some(cached_id) = membership.active_subunit_id {
            if let Some(cached) = self.store.find_subunit(cached_id).await? {
                if cached.is_usable() && cached.organization_id == membership.organization_id {
                    return Ok(Some(cached));
                }
            }
        }

        // Listing is ordered main first, so the first usable entry covers
        // both the main sub-unit and the fallback.
        let Some(picked) = self
            .store
            .subunits_of(membership.organization_id)
            .await?
            .into_iter()
            .find(Subunit::is_usable)
        else {
            return Ok(None);
        };

        if membership.active_subunit_id != Some(picked.id) {
            if let Err(e) = self
                .store
                .set_active_subunit(membership.id, Some(picked.id))
                .await
            {
                warn!(
                    membership_id = %membership.id,
                    subunit_id = %picked.id,
                    error = %e,
                    "Failed to cache active sub-unit"
                );
            }
        }

        Ok(Some(picked))
    }

    async fn with_organization(
        &self,
        membership: Membership,
    ) -> AppResult<Option<ActiveRelationship>> {
        Ok(self
            .store
            .find_organization(membership.organization_id)
            .await?
            .map(|organization| ActiveRelationship {
                membership,
                organization,
            }))
    }
}

/// Turn a failed best-effort lookup into "nothing", logging by severity.
fn degrade<T>(result: AppResult<Option<T>>, what: &str) -> Option<T> {
    match result {
        Ok(found) => found,
        Err(e) => {
            match e.kind {
                ErrorKind::NotFound => debug!(error = %e, "No {what} resolved"),
                ErrorKind::Database | ErrorKind::ServiceUnavailable => {
                    warn!(error = %e, "Store failure while resolving {what}")
                }
                _ => error!(error = %e, "Unexpected failure while resolving {what}"),
            }
            None
        }
    }
}
