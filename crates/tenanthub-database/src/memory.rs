//! In-memory tenancy store using a Tokio mutex, for tests and single-node
//! development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use tenanthub_core::error::AppError;
use tenanthub_core::result::AppResult;
use tenanthub_core::types::{FederationId, MembershipId, OrganizationId, PrincipalId, SubunitId};
use tenanthub_entity::federation::Federation;
use tenanthub_entity::membership::Membership;
use tenanthub_entity::membership::model::ensure_same_organization;
use tenanthub_entity::organization::Organization;
use tenanthub_entity::subunit::{Subunit, sort_main_first};

use crate::scoping::{ScopeFilter, ScopedSource};
use crate::store::TenancyStore;

/// Internal state for the memory store.
#[derive(Debug, Default)]
struct InnerState {
    federations: HashMap<FederationId, Federation>,
    organizations: HashMap<OrganizationId, Organization>,
    subunits: HashMap<SubunitId, Subunit>,
    memberships: HashMap<MembershipId, Membership>,
}

impl InnerState {
    fn federation_of(&self, organization_id: OrganizationId) -> Option<FederationId> {
        self.organizations
            .get(&organization_id)
            .and_then(|o| o.federation_id)
    }

    fn check_active_subunit(&self, membership: &Membership) -> AppResult<()> {
        let Some(subunit_id) = membership.active_subunit_id else {
            return Ok(());
        };
        let subunit = self
            .subunits
            .get(&subunit_id)
            .ok_or_else(|| AppError::validation(format!("Unknown sub-unit {subunit_id}")))?;
        ensure_same_organization(membership.organization_id, subunit)
    }

    fn membership_mut(&mut self, id: MembershipId) -> AppResult<&mut Membership> {
        self.memberships
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Membership {id} not found")))
    }

    fn deactivate_others(&mut self, principal_id: PrincipalId, keep: MembershipId) {
        let now = Utc::now();
        for other in self.memberships.values_mut() {
            if other.principal_id == principal_id && other.id != keep && other.is_active {
                other.is_active = false;
                other.updated_at = now;
            }
        }
    }
}

/// [`TenancyStore`] keeping every row in process memory.
///
/// Enforces the same write invariants as the PostgreSQL schema. Suitable
/// for tests and single-node development only.
#[derive(Debug, Clone, Default)]
pub struct MemoryTenancyStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryTenancyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a federation.
    pub async fn insert_federation(&self, federation: Federation) -> Federation {
        let mut state = self.state.lock().await;
        state.federations.insert(federation.id, federation.clone());
        federation
    }

    /// Seed an organization. Its federation, if any, must already exist.
    pub async fn insert_organization(&self, organization: Organization) -> AppResult<Organization> {
        let mut state = self.state.lock().await;
        if let Some(federation_id) = organization.federation_id {
            if !state.federations.contains_key(&federation_id) {
                return Err(AppError::validation(format!(
                    "Unknown federation {federation_id}"
                )));
            }
        }
        state
            .organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    /// Seed a sub-unit. Its organization must already exist.
    pub async fn insert_subunit(&self, subunit: Subunit) -> AppResult<Subunit> {
        let mut state = self.state.lock().await;
        if !state.organizations.contains_key(&subunit.organization_id) {
            return Err(AppError::validation(format!(
                "Unknown organization {}",
                subunit.organization_id
            )));
        }
        state.subunits.insert(subunit.id, subunit.clone());
        Ok(subunit)
    }

    /// Soft-delete a sub-unit.
    pub async fn delete_subunit(&self, id: SubunitId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let subunit = state
            .subunits
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Sub-unit {id} not found")))?;
        subunit.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl TenancyStore for MemoryTenancyStore {
    async fn find_federation(&self, id: FederationId) -> AppResult<Option<Federation>> {
        Ok(self.state.lock().await.federations.get(&id).cloned())
    }

    async fn find_organization(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        Ok(self.state.lock().await.organizations.get(&id).cloned())
    }

    async fn find_subunit(&self, id: SubunitId) -> AppResult<Option<Subunit>> {
        Ok(self.state.lock().await.subunits.get(&id).cloned())
    }

    async fn subunits_of(&self, organization_id: OrganizationId) -> AppResult<Vec<Subunit>> {
        let state = self.state.lock().await;
        let mut subunits: Vec<Subunit> = state
            .subunits
            .values()
            .filter(|s| s.organization_id == organization_id && s.deleted_at.is_none())
            .cloned()
            .collect();
        sort_main_first(&mut subunits);
        Ok(subunits)
    }

    async fn find_membership(&self, id: MembershipId) -> AppResult<Option<Membership>> {
        Ok(self.state.lock().await.memberships.get(&id).cloned())
    }

    async fn find_membership_for(
        &self,
        principal_id: PrincipalId,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Membership>> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .values()
            .find(|m| m.principal_id == principal_id && m.organization_id == organization_id)
            .cloned())
    }

    async fn memberships_of(&self, principal_id: PrincipalId) -> AppResult<Vec<Membership>> {
        let state = self.state.lock().await;
        let mut memberships: Vec<Membership> = state
            .memberships
            .values()
            .filter(|m| m.principal_id == principal_id)
            .cloned()
            .collect();
        memberships.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(memberships)
    }

    async fn insert_membership(&self, membership: &Membership) -> AppResult<Membership> {
        let mut state = self.state.lock().await;

        if !state
            .organizations
            .contains_key(&membership.organization_id)
        {
            return Err(AppError::validation(format!(
                "Unknown organization {}",
                membership.organization_id
            )));
        }
        let duplicate = state.memberships.values().any(|m| {
            m.principal_id == membership.principal_id
                && m.organization_id == membership.organization_id
        });
        if duplicate {
            return Err(AppError::conflict(
                "A membership for this principal and organization already exists",
            ));
        }
        state.check_active_subunit(membership)?;

        if membership.is_active {
            state.deactivate_others(membership.principal_id, membership.id);
        }
        state.memberships.insert(membership.id, membership.clone());

        info!(
            membership_id = %membership.id,
            principal_id = %membership.principal_id,
            organization_id = %membership.organization_id,
            "Membership stored"
        );
        Ok(membership.clone())
    }

    async fn update_membership(&self, membership: &Membership) -> AppResult<Membership> {
        let mut state = self.state.lock().await;
        state.check_active_subunit(membership)?;

        let stored = state.membership_mut(membership.id)?;
        stored.role = membership.role.clone();
        stored.capabilities = membership.capabilities;
        stored.status = membership.status;
        stored.active_subunit_id = membership.active_subunit_id;
        stored.delegated_subunits = membership.delegated_subunits.clone();
        stored.is_active = stored.is_active && membership.is_active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn activate_membership(&self, id: MembershipId) -> AppResult<Membership> {
        let mut state = self.state.lock().await;
        let principal_id = state.membership_mut(id)?.principal_id;

        state.deactivate_others(principal_id, id);
        let target = state.membership_mut(id)?;
        target.is_active = true;
        target.updated_at = Utc::now();

        debug!(membership_id = %id, principal_id = %principal_id, "Membership activated");
        Ok(target.clone())
    }

    async fn set_active_subunit(
        &self,
        id: MembershipId,
        subunit_id: Option<SubunitId>,
    ) -> AppResult<Membership> {
        let mut state = self.state.lock().await;

        let mut candidate = state
            .memberships
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Membership {id} not found")))?;
        candidate.active_subunit_id = subunit_id;
        state.check_active_subunit(&candidate)?;

        let stored = state.membership_mut(id)?;
        stored.active_subunit_id = subunit_id;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl ScopedSource<Subunit> for MemoryTenancyStore {
    async fn fetch_scoped(
        &self,
        filter: &ScopeFilter,
        include_deleted: bool,
    ) -> AppResult<Vec<Subunit>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Subunit> = state
            .subunits
            .values()
            .filter(|s| include_deleted || s.deleted_at.is_none())
            .filter(|s| filter.admits(s.organization_id, state.federation_of(s.organization_id)))
            .cloned()
            .collect();
        sort_main_first(&mut rows);
        Ok(rows)
    }
}

#[async_trait]
impl ScopedSource<Membership> for MemoryTenancyStore {
    async fn fetch_scoped(
        &self,
        filter: &ScopeFilter,
        include_deleted: bool,
    ) -> AppResult<Vec<Membership>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Membership> = state
            .memberships
            .values()
            .filter(|m| include_deleted || m.is_enabled())
            .filter(|m| filter.admits(m.organization_id, state.federation_of(m.organization_id)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }
}
