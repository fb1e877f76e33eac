//! The persistence boundary of the tenancy core.

use async_trait::async_trait;

use tenanthub_core::result::AppResult;
use tenanthub_core::types::{FederationId, MembershipId, OrganizationId, PrincipalId, SubunitId};
use tenanthub_entity::federation::Federation;
use tenanthub_entity::membership::Membership;
use tenanthub_entity::organization::Organization;
use tenanthub_entity::subunit::Subunit;

/// Reads and writes the tenancy rows the resolvers and services need.
///
/// Two implementations are provided:
/// - [`crate::PgTenancyStore`] backed by PostgreSQL
/// - [`crate::MemoryTenancyStore`] backed by a `tokio::sync::Mutex`
///
/// Implementations must keep these invariants on every write:
/// - `activate_membership` clears `is_active` on the principal's other
///   memberships in the same atomic step that sets it on the target;
/// - a stored `active_subunit_id` belongs to the membership's organization,
///   otherwise the write fails with a validation error and changes nothing;
/// - `(principal_id, organization_id)` stays unique (conflict error).
#[async_trait]
pub trait TenancyStore: Send + Sync + 'static {
    /// Look up a federation.
    async fn find_federation(&self, id: FederationId) -> AppResult<Option<Federation>>;

    /// Look up an organization.
    async fn find_organization(&self, id: OrganizationId) -> AppResult<Option<Organization>>;

    /// Look up a sub-unit, including soft-deleted ones.
    async fn find_subunit(&self, id: SubunitId) -> AppResult<Option<Subunit>>;

    /// Non-deleted sub-units of an organization, main first, then by id.
    async fn subunits_of(&self, organization_id: OrganizationId) -> AppResult<Vec<Subunit>>;

    /// Look up a membership.
    async fn find_membership(&self, id: MembershipId) -> AppResult<Option<Membership>>;

    /// Look up the membership joining a principal and an organization.
    async fn find_membership_for(
        &self,
        principal_id: PrincipalId,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Membership>>;

    /// Every membership of a principal, disabled ones included, ordered by
    /// creation time then id.
    async fn memberships_of(&self, principal_id: PrincipalId) -> AppResult<Vec<Membership>>;

    /// Insert a new membership.
    async fn insert_membership(&self, membership: &Membership) -> AppResult<Membership>;

    /// Persist the mutable fields of an existing membership.
    ///
    /// `is_active` may be cleared through this call but is never set by it.
    async fn update_membership(&self, membership: &Membership) -> AppResult<Membership>;

    /// Make a membership the principal's only active one.
    async fn activate_membership(&self, id: MembershipId) -> AppResult<Membership>;

    /// Store (or clear) the cached active sub-unit of a membership.
    async fn set_active_subunit(
        &self,
        id: MembershipId,
        subunit_id: Option<SubunitId>,
    ) -> AppResult<Membership>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
