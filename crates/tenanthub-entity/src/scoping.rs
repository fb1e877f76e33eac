//! Static scoping registrations for tenant-owned entity types.
//!
//! Every type that is read through the scoped persistence layer declares
//! here, at compile time, which column ties a row to its tenant. The
//! persistence layer never inspects a type to discover that column.

use tenanthub_core::types::{OrganizationId, SubunitId};

use crate::membership::Membership;
use crate::subunit::Subunit;

/// How a row references its owning organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationRef {
    /// The named column holds an organization id.
    Organization(&'static str),
    /// The named column holds a sub-unit id; the organization is the
    /// sub-unit's owner.
    Subunit(&'static str),
}

impl OrganizationRef {
    /// The referencing column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Organization(column) | Self::Subunit(column) => column,
        }
    }
}

/// Table-level facts the scoped persistence layer needs about an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRegistration {
    /// Stable entity name used as the registry key.
    pub entity: &'static str,
    /// Backing table.
    pub table: &'static str,
    /// Column tying a row to its organization.
    pub reference: OrganizationRef,
    /// SQL predicate that holds for rows that are not soft-deleted.
    pub live_predicate: Option<&'static str>,
    /// `ORDER BY` clause for stable listings.
    pub order_by: &'static str,
}

/// The owner reference of a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOwner {
    /// Owned directly by an organization.
    Organization(OrganizationId),
    /// Owned through a sub-unit.
    Subunit(SubunitId),
}

/// Implemented by every entity type that lives inside a tenant.
pub trait TenantScoped: Clone + Send + Sync + Unpin + 'static {
    /// The static registration for this type.
    const REGISTRATION: ScopeRegistration;

    /// Which tenant unit owns this row.
    fn owner(&self) -> ScopeOwner;

    /// Whether this row is soft-deleted.
    fn is_soft_deleted(&self) -> bool;
}

impl TenantScoped for Subunit {
    const REGISTRATION: ScopeRegistration = ScopeRegistration {
        entity: "subunit",
        table: "subunits",
        reference: OrganizationRef::Organization("organization_id"),
        live_predicate: Some("deleted_at IS NULL"),
        order_by: "is_main DESC, id ASC",
    };

    fn owner(&self) -> ScopeOwner {
        ScopeOwner::Organization(self.organization_id)
    }

    fn is_soft_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl TenantScoped for Membership {
    const REGISTRATION: ScopeRegistration = ScopeRegistration {
        entity: "membership",
        table: "memberships",
        reference: OrganizationRef::Organization("organization_id"),
        live_predicate: Some("status = 'active'"),
        order_by: "created_at ASC, id ASC",
    };

    fn owner(&self) -> ScopeOwner {
        ScopeOwner::Organization(self.organization_id)
    }

    fn is_soft_deleted(&self) -> bool {
        !self.is_enabled()
    }
}
