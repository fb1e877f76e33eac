//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use tenanthub_core::error::AppError;
use tenanthub_core::types::{OrganizationId, PrincipalId, SubunitId};
use tenanthub_entity::membership::{Capability, Role};
use tenanthub_service::{CreateMembership, UpdateMembership};

/// Create membership request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMembershipRequest {
    /// The principal joining.
    pub principal_id: PrincipalId,
    /// The organization being joined.
    pub organization_id: OrganizationId,
    /// Role name; legacy names are accepted verbatim.
    #[validate(length(min = 1, max = 64, message = "Role must be 1-64 characters"))]
    pub role: String,
    /// Initial active sub-unit.
    #[serde(default)]
    pub active_subunit_id: Option<SubunitId>,
    /// Sub-units the membership is restricted to.
    #[serde(default)]
    #[validate(length(max = 500))]
    pub delegated_subunits: Vec<SubunitId>,
}

impl CreateMembershipRequest {
    /// Validate and convert into the service command.
    pub fn into_command(self) -> Result<CreateMembership, AppError> {
        self.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(CreateMembership {
            principal_id: self.principal_id,
            organization_id: self.organization_id,
            role: Role::from(self.role),
            active_subunit_id: self.active_subunit_id,
            delegated_subunits: self.delegated_subunits,
        })
    }
}

/// Update membership request body. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMembershipRequest {
    /// New role name.
    #[validate(length(min = 1, max = 64, message = "Role must be 1-64 characters"))]
    pub role: Option<String>,
    /// Re-derive capability flags from the role.
    #[serde(default)]
    pub recompute_capabilities: bool,
    /// Explicit capability flags.
    pub capabilities: Option<Vec<Capability>>,
    /// New delegated sub-unit set.
    #[validate(length(max = 500))]
    pub delegated_subunits: Option<Vec<SubunitId>>,
    /// New active sub-unit.
    pub active_subunit_id: Option<SubunitId>,
    /// Clear the active sub-unit.
    #[serde(default)]
    pub clear_active_subunit: bool,
}

impl UpdateMembershipRequest {
    /// Validate and convert into the service command.
    pub fn into_command(self) -> Result<UpdateMembership, AppError> {
        self.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        if self.clear_active_subunit && self.active_subunit_id.is_some() {
            return Err(AppError::validation(
                "active_subunit_id and clear_active_subunit are mutually exclusive",
            ));
        }
        Ok(UpdateMembership {
            role: self.role.map(Role::from),
            recompute_capabilities: self.recompute_capabilities,
            capabilities: self.capabilities,
            delegated_subunits: self.delegated_subunits,
            active_subunit_id: self.active_subunit_id,
            clear_active_subunit: self.clear_active_subunit,
        })
    }
}

/// Switch active sub-unit request body; `null` clears the cached choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActiveSubunitRequest {
    /// The sub-unit to act in.
    pub subunit_id: Option<SubunitId>,
}
