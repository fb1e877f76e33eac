//! Membership entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tenanthub_core::AppError;
use tenanthub_core::types::{MembershipId, OrganizationId, PrincipalId, SubunitId};

use super::capability::Capabilities;
use super::role::Role;
use super::status::MembershipStatus;
use crate::subunit::Subunit;

/// Grants a principal a role inside one organization.
///
/// `(principal_id, organization_id)` is unique. At most one membership per
/// principal carries `is_active = true`; that flag marks the organization
/// the principal is currently acting as, independent of `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Membership {
    /// Unique membership identifier.
    pub id: MembershipId,
    /// The principal holding the membership.
    pub principal_id: PrincipalId,
    /// The organization the membership belongs to.
    pub organization_id: OrganizationId,
    /// Role as stored (aliases are kept verbatim).
    pub role: Role,
    /// Capability flags, derived from `role` on creation.
    #[sqlx(flatten)]
    pub capabilities: Capabilities,
    /// Lifecycle status.
    pub status: MembershipStatus,
    /// Whether this is the principal's currently selected organization.
    pub is_active: bool,
    /// Cached sub-unit the principal is acting in.
    pub active_subunit_id: Option<SubunitId>,
    /// Sub-units this membership is restricted to; empty means all of them.
    pub delegated_subunits: Vec<SubunitId>,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
    /// When the membership was last updated.
    pub updated_at: DateTime<Utc>,
    /// The principal who created the membership, if any.
    pub created_by: Option<PrincipalId>,
}

impl Membership {
    /// Build a fresh row from creation data.
    pub fn from_new(data: NewMembership) -> Self {
        let now = Utc::now();
        Self {
            id: MembershipId::new(),
            principal_id: data.principal_id,
            organization_id: data.organization_id,
            role: data.role,
            capabilities: data.capabilities,
            status: MembershipStatus::Active,
            is_active: false,
            active_subunit_id: data.active_subunit_id,
            delegated_subunits: data.delegated_subunits,
            created_at: now,
            updated_at: now,
            created_by: data.created_by,
        }
    }

    /// The role used for every comparison and derivation.
    pub fn effective_role(&self) -> Role {
        self.role.normalize()
    }

    /// Check if the membership currently grants its role.
    pub fn is_enabled(&self) -> bool {
        self.status.is_enabled()
    }

    /// Check whether the membership is limited to an explicit sub-unit set.
    pub fn is_delegated(&self) -> bool {
        !self.delegated_subunits.is_empty()
    }

    /// Ensure `subunit` may be stored as this membership's active sub-unit.
    pub fn check_subunit(&self, subunit: &Subunit) -> Result<(), AppError> {
        ensure_same_organization(self.organization_id, subunit)
    }
}

/// Reject a sub-unit that belongs to a different organization.
pub fn ensure_same_organization(
    organization_id: OrganizationId,
    subunit: &Subunit,
) -> Result<(), AppError> {
    if subunit.organization_id != organization_id {
        return Err(AppError::validation(format!(
            "Sub-unit {} belongs to organization {}, not {}",
            subunit.id, subunit.organization_id, organization_id
        )));
    }
    Ok(())
}

/// Data required to insert a new membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMembership {
    /// The principal receiving the membership.
    pub principal_id: PrincipalId,
    /// The organization granting it.
    pub organization_id: OrganizationId,
    /// Assigned role.
    pub role: Role,
    /// Capability flags (already derived).
    pub capabilities: Capabilities,
    /// Initial active sub-unit.
    pub active_subunit_id: Option<SubunitId>,
    /// Delegated sub-units.
    pub delegated_subunits: Vec<SubunitId>,
    /// The creating principal.
    pub created_by: Option<PrincipalId>,
}
