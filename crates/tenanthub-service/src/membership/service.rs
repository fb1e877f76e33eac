//! Membership write paths: create, update, activate, switch sub-unit, disable.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use tenanthub_auth::rbac::{RolePolicies, TenantEnforcer};
use tenanthub_core::error::AppError;
use tenanthub_core::types::{MembershipId, OrganizationId, PrincipalId, SubunitId};
use tenanthub_database::{ScopedRepository, TenancyStore};
use tenanthub_entity::membership::model::ensure_same_organization;
use tenanthub_entity::membership::{
    Capabilities, Capability, Membership, MembershipStatus, NewMembership, Role,
};
use tenanthub_entity::organization::Organization;

use crate::context::RequestContext;

/// Request to create a membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    /// The principal joining.
    pub principal_id: PrincipalId,
    /// The organization being joined.
    pub organization_id: OrganizationId,
    /// Assigned role.
    pub role: Role,
    /// Initial active sub-unit.
    #[serde(default)]
    pub active_subunit_id: Option<SubunitId>,
    /// Sub-units the membership is restricted to.
    #[serde(default)]
    pub delegated_subunits: Vec<SubunitId>,
}

/// Request to update a membership. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMembership {
    /// New role.
    #[serde(default)]
    pub role: Option<Role>,
    /// Re-derive capability flags from the (new) role.
    #[serde(default)]
    pub recompute_capabilities: bool,
    /// Explicit capability flags, applied after any recompute.
    #[serde(default)]
    pub capabilities: Option<Vec<Capability>>,
    /// New delegated sub-unit set.
    #[serde(default)]
    pub delegated_subunits: Option<Vec<SubunitId>>,
    /// New active sub-unit.
    #[serde(default)]
    pub active_subunit_id: Option<SubunitId>,
    /// Clear the active sub-unit.
    #[serde(default)]
    pub clear_active_subunit: bool,
}

/// Handles membership lifecycle operations.
#[derive(Clone)]
pub struct MembershipService {
    /// Tenancy store.
    store: Arc<dyn TenancyStore>,
    /// Role → capability derivation.
    policies: Arc<RolePolicies>,
    /// Management checks.
    enforcer: Arc<TenantEnforcer>,
    /// Scoped membership reads.
    memberships: ScopedRepository<Membership>,
}

impl std::fmt::Debug for MembershipService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipService").finish()
    }
}

impl MembershipService {
    /// Creates a new membership service.
    pub fn new(
        store: Arc<dyn TenancyStore>,
        policies: Arc<RolePolicies>,
        enforcer: Arc<TenantEnforcer>,
        memberships: ScopedRepository<Membership>,
    ) -> Self {
        Self {
            store,
            policies,
            enforcer,
            memberships,
        }
    }

    /// Memberships of the tenant the current request acts as.
    pub async fn list_scoped(&self) -> Result<Vec<Membership>, AppError> {
        self.memberships.all().await
    }

    /// Gets a membership visible to the actor.
    pub async fn get(&self, ctx: &RequestContext, id: MembershipId) -> Result<Membership, AppError> {
        let membership = self.load(id).await?;
        if membership.principal_id != ctx.principal_id() {
            let organization = self.load_organization(membership.organization_id).await?;
            self.authorize_manage(ctx, &organization).await?;
        }
        Ok(membership)
    }

    /// Creates a membership with capabilities derived from its role.
    ///
    /// A super-admin membership can only be re-saved over an existing
    /// super-admin record, never created fresh.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateMembership,
    ) -> Result<Membership, AppError> {
        let organization = self.load_organization(req.organization_id).await?;
        let existing = self
            .store
            .find_membership_for(req.principal_id, req.organization_id)
            .await?;

        if req.role.is_top_level() {
            return match existing {
                Some(record) if record.role.is_top_level() => {
                    self.require_top_level_actor(ctx).await?;
                    self.resave(record, &req).await
                }
                Some(_) => Err(AppError::conflict(
                    "A membership for this principal and organization already exists",
                )),
                None => Err(AppError::validation(format!(
                    "Role '{}' cannot be assigned to a new membership",
                    req.role
                ))),
            };
        }

        let actor_membership = self.authorize_manage(ctx, &organization).await?;
        if let Some(actor) = &actor_membership {
            if req.role.outranks(&actor.effective_role()) {
                return Err(AppError::authorization(format!(
                    "Role '{}' is above the actor's own role",
                    req.role
                )));
            }
        }

        if existing.is_some() {
            return Err(AppError::conflict(
                "A membership for this principal and organization already exists",
            ));
        }

        self.check_subunits(
            organization.id,
            req.active_subunit_id,
            &req.delegated_subunits,
        )
        .await?;

        let membership = Membership::from_new(NewMembership {
            principal_id: req.principal_id,
            organization_id: req.organization_id,
            capabilities: self.policies.derive_capabilities(&req.role),
            role: req.role,
            active_subunit_id: req.active_subunit_id,
            delegated_subunits: req.delegated_subunits,
            created_by: Some(ctx.principal_id()),
        });
        let created = self.store.insert_membership(&membership).await?;

        info!(
            membership_id = %created.id,
            principal_id = %created.principal_id,
            organization_id = %created.organization_id,
            role = %created.role,
            created_by = %ctx.principal_id(),
            "Membership created"
        );

        Ok(created)
    }

    /// Updates role, capabilities, delegation or active sub-unit.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: MembershipId,
        req: UpdateMembership,
    ) -> Result<Membership, AppError> {
        let mut membership = self.load(id).await?;
        let new_role = req.role.clone().unwrap_or_else(|| membership.role.clone());
        let actor = self.authorize_edit(ctx, &membership, &new_role).await?;

        if new_role.is_top_level() && !membership.role.is_top_level() {
            self.require_top_level_actor(ctx).await?;
        }

        // Only values the request changes are validated; a cached sub-unit
        // that has since been closed does not block unrelated edits.
        let changed_active = req
            .active_subunit_id
            .filter(|requested| membership.active_subunit_id != Some(*requested));
        self.check_subunits(
            membership.organization_id,
            changed_active,
            req.delegated_subunits.as_deref().unwrap_or_default(),
        )
        .await?;

        let active_subunit_id = if req.clear_active_subunit {
            None
        } else {
            req.active_subunit_id.or(membership.active_subunit_id)
        };
        let delegated = req
            .delegated_subunits
            .clone()
            .unwrap_or_else(|| membership.delegated_subunits.clone());

        if req.recompute_capabilities {
            membership.capabilities = self.policies.derive_capabilities(&new_role);
        }
        if let Some(explicit) = &req.capabilities {
            let requested = Capabilities::from_slice(explicit);
            if let Some(actor) = &actor {
                if !self
                    .enforcer
                    .can_grant(actor, &membership.capabilities, &requested)
                {
                    return Err(AppError::authorization(
                        "Cannot grant capabilities the actor does not hold",
                    ));
                }
            }
            membership.capabilities = requested;
        }
        membership.role = new_role;
        membership.active_subunit_id = active_subunit_id;
        membership.delegated_subunits = delegated;

        let updated = self.store.update_membership(&membership).await?;

        info!(
            membership_id = %updated.id,
            role = %updated.role,
            recomputed = req.recompute_capabilities,
            updated_by = %ctx.principal_id(),
            "Membership updated"
        );

        Ok(updated)
    }

    /// Makes one of the actor's own memberships the active one.
    pub async fn activate(
        &self,
        ctx: &RequestContext,
        id: MembershipId,
    ) -> Result<Membership, AppError> {
        let membership = self.load_own(ctx, id).await?;
        if !membership.is_enabled() {
            return Err(AppError::validation("A disabled membership cannot be activated"));
        }

        let activated = self.store.activate_membership(id).await?;
        info!(
            principal_id = %ctx.principal_id(),
            organization_id = %activated.organization_id,
            "Active organization switched"
        );
        Ok(activated)
    }

    /// Sets or clears the active sub-unit of one of the actor's own
    /// memberships.
    pub async fn set_active_subunit(
        &self,
        ctx: &RequestContext,
        id: MembershipId,
        subunit_id: Option<SubunitId>,
    ) -> Result<Membership, AppError> {
        let membership = self.load_own(ctx, id).await?;
        self.check_subunits(membership.organization_id, subunit_id, &[])
            .await?;

        let updated = self.store.set_active_subunit(id, subunit_id).await?;
        info!(
            membership_id = %id,
            subunit_id = ?subunit_id,
            "Active sub-unit switched"
        );
        Ok(updated)
    }

    /// Soft-disables a membership. Memberships are never deleted.
    pub async fn disable(
        &self,
        ctx: &RequestContext,
        id: MembershipId,
    ) -> Result<Membership, AppError> {
        let mut membership = self.load(id).await?;
        let role = membership.role.clone();
        self.authorize_edit(ctx, &membership, &role).await?;

        membership.status = MembershipStatus::Disabled;
        membership.is_active = false;
        let disabled = self.store.update_membership(&membership).await?;

        info!(
            membership_id = %id,
            disabled_by = %ctx.principal_id(),
            "Membership disabled"
        );
        Ok(disabled)
    }

    async fn resave(
        &self,
        mut record: Membership,
        req: &CreateMembership,
    ) -> Result<Membership, AppError> {
        self.check_subunits(
            record.organization_id,
            req.active_subunit_id,
            &req.delegated_subunits,
        )
        .await?;
        record.status = MembershipStatus::Active;
        record.active_subunit_id = req.active_subunit_id;
        record.delegated_subunits = req.delegated_subunits.clone();
        self.store.update_membership(&record).await
    }

    /// Authorize a change to `membership` that leaves it with `new_role`.
    ///
    /// Returns the actor's authorizing membership, `None` for platform
    /// superusers.
    async fn authorize_edit(
        &self,
        ctx: &RequestContext,
        membership: &Membership,
        new_role: &Role,
    ) -> Result<Option<Membership>, AppError> {
        if membership.principal_id == ctx.principal_id() {
            return Err(AppError::authorization(
                "Principals cannot modify their own membership",
            ));
        }

        let organization = self.load_organization(membership.organization_id).await?;
        let Some(actor) = self.authorize_manage(ctx, &organization).await? else {
            return Ok(None);
        };

        let actor_role = actor.effective_role();
        if !actor_role.outranks(&membership.role) || new_role.outranks(&actor_role) {
            return Err(AppError::authorization(format!(
                "Role '{actor_role}' cannot change a '{}' membership to '{new_role}'",
                membership.role
            )));
        }
        Ok(Some(actor))
    }

    /// Find the actor's membership that lets them manage members of
    /// `organization`. Platform superusers need none and get `None`.
    async fn authorize_manage(
        &self,
        ctx: &RequestContext,
        organization: &Organization,
    ) -> Result<Option<Membership>, AppError> {
        if ctx.is_platform_superuser() {
            return Ok(None);
        }

        for candidate in self.store.memberships_of(ctx.principal_id()).await? {
            let Some(own) = self
                .store
                .find_organization(candidate.organization_id)
                .await?
            else {
                continue;
            };
            if self
                .enforcer
                .can_manage_members(&candidate, &own, organization)
            {
                return Ok(Some(candidate));
            }
        }

        Err(AppError::authorization(format!(
            "Not allowed to manage members of organization {}",
            organization.id
        )))
    }

    async fn require_top_level_actor(&self, ctx: &RequestContext) -> Result<(), AppError> {
        if ctx.is_platform_superuser() {
            return Ok(());
        }
        let top_level = self
            .store
            .memberships_of(ctx.principal_id())
            .await?
            .iter()
            .any(|m| m.is_enabled() && m.effective_role().is_top_level());
        if top_level {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Only super-admins can assign the super-admin role",
            ))
        }
    }

    /// Validate that every referenced sub-unit exists and belongs to
    /// `organization_id`; the active one must also be usable.
    async fn check_subunits(
        &self,
        organization_id: OrganizationId,
        active: Option<SubunitId>,
        delegated: &[SubunitId],
    ) -> Result<(), AppError> {
        if let Some(active_id) = active {
            let subunit = self
                .store
                .find_subunit(active_id)
                .await?
                .ok_or_else(|| AppError::validation(format!("Unknown sub-unit {active_id}")))?;
            ensure_same_organization(organization_id, &subunit)?;
            if !subunit.is_usable() {
                return Err(AppError::validation(format!(
                    "Sub-unit {active_id} is inactive or deleted"
                )));
            }
        }

        for delegated_id in delegated {
            let subunit = self
                .store
                .find_subunit(*delegated_id)
                .await?
                .ok_or_else(|| AppError::validation(format!("Unknown sub-unit {delegated_id}")))?;
            ensure_same_organization(organization_id, &subunit)?;
        }
        Ok(())
    }

    async fn load(&self, id: MembershipId) -> Result<Membership, AppError> {
        self.store
            .find_membership(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Membership {id} not found")))
    }

    async fn load_own(&self, ctx: &RequestContext, id: MembershipId) -> Result<Membership, AppError> {
        let membership = self.load(id).await?;
        if membership.principal_id != ctx.principal_id() {
            return Err(AppError::not_found(format!("Membership {id} not found")));
        }
        Ok(membership)
    }

    async fn load_organization(&self, id: OrganizationId) -> Result<Organization, AppError> {
        self.store
            .find_organization(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Organization {id} not found")))
    }
}
