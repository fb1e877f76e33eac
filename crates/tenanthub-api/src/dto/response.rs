//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenanthub_core::types::{FederationId, MembershipId, OrganizationId, PrincipalId, SubunitId};
use tenanthub_entity::TenantContext;
use tenanthub_entity::context::ResolutionSource;
use tenanthub_entity::membership::{Capability, Membership, MembershipStatus};
use tenanthub_entity::subunit::Subunit;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Store status.
    pub store: String,
    /// Entity types readable through the scoped layer.
    pub scoped_entities: Vec<String>,
}

/// Membership as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipResponse {
    /// Membership ID.
    pub id: MembershipId,
    /// Principal ID.
    pub principal_id: PrincipalId,
    /// Organization ID.
    pub organization_id: OrganizationId,
    /// Role as stored.
    pub role: String,
    /// Role used for authorization (legacy names mapped).
    pub effective_role: String,
    /// Granted capability flags.
    pub capabilities: Vec<Capability>,
    /// Lifecycle status.
    pub status: MembershipStatus,
    /// Whether this is the principal's selected organization.
    pub is_active: bool,
    /// Cached active sub-unit.
    pub active_subunit_id: Option<SubunitId>,
    /// Delegated sub-units; empty means unrestricted.
    pub delegated_subunits: Vec<SubunitId>,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<Membership> for MembershipResponse {
    fn from(m: Membership) -> Self {
        Self {
            effective_role: m.effective_role().to_string(),
            capabilities: m.capabilities.granted(),
            id: m.id,
            principal_id: m.principal_id,
            organization_id: m.organization_id,
            role: m.role.to_string(),
            status: m.status,
            is_active: m.is_active,
            active_subunit_id: m.active_subunit_id,
            delegated_subunits: m.delegated_subunits,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Sub-unit as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubunitResponse {
    /// Sub-unit ID.
    pub id: SubunitId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Main sub-unit flag.
    pub is_main: bool,
    /// Active flag.
    pub is_active: bool,
}

impl From<Subunit> for SubunitResponse {
    fn from(s: Subunit) -> Self {
        Self {
            id: s.id,
            organization_id: s.organization_id,
            name: s.name,
            is_main: s.is_main,
            is_active: s.is_active,
        }
    }
}

/// Id and name of a resolved tenant level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef<I> {
    /// Identifier.
    pub id: I,
    /// Display name.
    pub name: String,
}

/// The tenant context the request resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct ContextResponse {
    /// Authenticated principal.
    pub principal_id: Option<PrincipalId>,
    /// Username of the principal.
    pub username: Option<String>,
    /// Membership backing the organization.
    pub membership_id: Option<MembershipId>,
    /// Role of that membership.
    pub role: Option<String>,
    /// Organization acted as.
    pub organization: Option<NamedRef<OrganizationId>>,
    /// Sub-unit acted in.
    pub subunit: Option<NamedRef<SubunitId>>,
    /// Federation in effect.
    pub federation: Option<NamedRef<FederationId>>,
    /// How the organization was chosen.
    pub source: ResolutionSource,
}

impl From<&TenantContext> for ContextResponse {
    fn from(ctx: &TenantContext) -> Self {
        Self {
            principal_id: ctx.principal_id(),
            username: ctx.principal.as_ref().map(|p| p.username.clone()),
            membership_id: ctx.membership.as_ref().map(|m| m.id),
            role: ctx.membership.as_ref().map(|m| m.role.to_string()),
            organization: ctx.organization.as_ref().map(|o| NamedRef {
                id: o.id,
                name: o.name.clone(),
            }),
            subunit: ctx.subunit.as_ref().map(|s| NamedRef {
                id: s.id,
                name: s.name.clone(),
            }),
            federation: ctx.federation.as_ref().map(|f| NamedRef {
                id: f.id,
                name: f.name.clone(),
            }),
            source: ctx.source,
        }
    }
}
