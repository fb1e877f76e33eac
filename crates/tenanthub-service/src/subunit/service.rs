//! Sub-unit reads for the current tenant.

use std::sync::Arc;

use tenanthub_auth::rbac::TenantEnforcer;
use tenanthub_core::error::AppError;
use tenanthub_database::{ScopedRepository, TenancyStore};
use tenanthub_entity::membership::Membership;
use tenanthub_entity::subunit::Subunit;

/// Lists sub-units visible to, or manageable by, the current request.
#[derive(Clone)]
pub struct SubunitService {
    /// Tenancy store.
    store: Arc<dyn TenancyStore>,
    /// Management checks.
    enforcer: Arc<TenantEnforcer>,
    /// Scoped sub-unit reads.
    subunits: ScopedRepository<Subunit>,
}

impl std::fmt::Debug for SubunitService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubunitService").finish()
    }
}

impl SubunitService {
    /// Creates a new sub-unit service.
    pub fn new(
        store: Arc<dyn TenancyStore>,
        enforcer: Arc<TenantEnforcer>,
        subunits: ScopedRepository<Subunit>,
    ) -> Self {
        Self {
            store,
            enforcer,
            subunits,
        }
    }

    /// Sub-units of the tenant the current request acts as.
    pub async fn list_scoped(&self) -> Result<Vec<Subunit>, AppError> {
        self.subunits.all().await
    }

    /// Sub-units `membership` may manage, main first.
    pub async fn accessible_for(&self, membership: &Membership) -> Result<Vec<Subunit>, AppError> {
        let all = self.store.subunits_of(membership.organization_id).await?;
        Ok(self.enforcer.accessible_subunits(membership, &all))
    }
}
