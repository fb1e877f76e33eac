//! Tenant management checks over memberships.

use std::collections::HashSet;

use tracing::debug;

use tenanthub_core::error::AppError;
use tenanthub_entity::membership::{Capabilities, Capability, Membership};
use tenanthub_entity::organization::Organization;
use tenanthub_entity::subunit::Subunit;

/// Decides what a membership may manage.
///
/// Every check is pure: callers load the organizations and sub-units
/// involved and pass them in. Disabled memberships grant nothing.
#[derive(Debug, Clone, Default)]
pub struct TenantEnforcer;

impl TenantEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Checks whether `membership` may manage `target`.
    ///
    /// `own` must be the membership's organization; it is used to compare
    /// federations.
    pub fn can_manage_organization(
        &self,
        membership: &Membership,
        own: &Organization,
        target: &Organization,
    ) -> bool {
        if !membership.is_enabled() || own.id != membership.organization_id {
            return false;
        }

        let role = membership.effective_role();
        if role.is_top_level() {
            return true;
        }
        if !role.is_organization_admin() {
            return false;
        }
        if target.id == own.id {
            return true;
        }

        let federation_grant = membership.capabilities.has(Capability::ManageFederation)
            || membership.role.is_legacy_alias();
        federation_grant && own.shares_federation_with(target)
    }

    /// Checks whether `membership` may manage the members of `target`.
    ///
    /// Inside its own organization `manage-members` is enough; the role
    /// hierarchy is checked by the caller. Other organizations also need
    /// [`Self::can_manage_organization`].
    pub fn can_manage_members(
        &self,
        membership: &Membership,
        own: &Organization,
        target: &Organization,
    ) -> bool {
        if !membership.is_enabled() || !membership.capabilities.has(Capability::ManageMembers) {
            return false;
        }
        if target.id == membership.organization_id {
            return true;
        }
        let allowed = self.can_manage_organization(membership, own, target);
        if !allowed {
            debug!(
                membership_id = %membership.id,
                target = %target.id,
                "Cross-organization member management denied"
            );
        }
        allowed
    }

    /// Checks whether `actor` may move a membership's flags from `current`
    /// to `requested`.
    ///
    /// Revoking is always allowed. Every newly granted flag must be held by
    /// the actor, and `manage-federation` can only be newly granted by a
    /// top-level role.
    pub fn can_grant(
        &self,
        actor: &Membership,
        current: &Capabilities,
        requested: &Capabilities,
    ) -> bool {
        if !actor.is_enabled() {
            return false;
        }
        let top_level = actor.effective_role().is_top_level();

        for capability in requested.granted() {
            if current.has(capability) {
                continue;
            }
            let held = actor.capabilities.has(capability);
            let federation_ok = capability != Capability::ManageFederation || top_level;
            if !held || !federation_ok {
                debug!(
                    actor = %actor.id,
                    capability = ?capability,
                    "Capability grant denied"
                );
                return false;
            }
        }
        true
    }

    /// Checks whether `membership` may manage `subunit`.
    pub fn can_manage_subunit(&self, membership: &Membership, subunit: &Subunit) -> bool {
        if !membership.is_enabled()
            || !membership.capabilities.has(Capability::ManageBranches)
            || subunit.organization_id != membership.organization_id
        {
            return false;
        }
        !membership.is_delegated() || membership.delegated_subunits.contains(&subunit.id)
    }

    /// Narrows `organization_subunits` to the ones `membership` may manage.
    ///
    /// Soft-deleted and inactive sub-units are always dropped. Order of the
    /// input is kept.
    pub fn accessible_subunits(
        &self,
        membership: &Membership,
        organization_subunits: &[Subunit],
    ) -> Vec<Subunit> {
        if !membership.is_enabled() || !membership.capabilities.has(Capability::ManageBranches) {
            return Vec::new();
        }

        let delegated: HashSet<_> = membership.delegated_subunits.iter().copied().collect();
        organization_subunits
            .iter()
            .filter(|s| s.organization_id == membership.organization_id && s.is_usable())
            .filter(|s| delegated.is_empty() || delegated.contains(&s.id))
            .cloned()
            .collect()
    }

    /// Fails with an authorization error unless `membership` carries
    /// `capability`.
    pub fn require_capability(
        &self,
        membership: &Membership,
        capability: Capability,
    ) -> Result<(), AppError> {
        if membership.is_enabled() && membership.capabilities.has(capability) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Membership {} lacks capability {capability:?}",
                membership.id
            )))
        }
    }
}
