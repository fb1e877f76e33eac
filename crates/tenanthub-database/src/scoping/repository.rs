//! The default read accessor for tenant-owned entities.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use tenanthub_core::result::AppResult;
use tenanthub_core::types::OrganizationId;
use tenanthub_entity::{TenantContext, TenantScoped};

use super::filter::ScopeFilter;
use super::registry::ScopeRegistry;

/// A backend able to load rows of `E` under a scope filter.
#[async_trait]
pub trait ScopedSource<E: TenantScoped>: Send + Sync + 'static {
    /// Load the rows of `E` admitted by `filter`.
    ///
    /// Soft-deleted rows are skipped unless `include_deleted` is set.
    async fn fetch_scoped(&self, filter: &ScopeFilter, include_deleted: bool) -> AppResult<Vec<E>>;
}

/// Tenant-scoped repository for any registered entity type.
pub struct ScopedRepository<E: TenantScoped> {
    source: Arc<dyn ScopedSource<E>>,
    registry: Arc<ScopeRegistry>,
}

impl<E: TenantScoped> Clone for ScopedRepository<E> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: TenantScoped> std::fmt::Debug for ScopedRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedRepository")
            .field("entity", &E::REGISTRATION.entity)
            .finish()
    }
}

impl<E: TenantScoped> ScopedRepository<E> {
    /// Create a scoped repository over `source`.
    pub fn new(source: Arc<dyn ScopedSource<E>>, registry: Arc<ScopeRegistry>) -> Self {
        Self { source, registry }
    }

    /// Live rows visible to the ambient request context.
    ///
    /// Outside any request scope only soft-deleted rows are hidden.
    pub async fn all(&self) -> AppResult<Vec<E>> {
        self.fetch(ScopeFilter::from_ambient(), false).await
    }

    /// Live rows visible to an explicitly passed context.
    pub async fn all_in(&self, context: Option<&TenantContext>) -> AppResult<Vec<E>> {
        self.fetch(ScopeFilter::from_context(context), false).await
    }

    /// Live rows under an explicit filter, for background jobs.
    pub async fn scoped_to(&self, filter: ScopeFilter) -> AppResult<Vec<E>> {
        self.fetch(filter, false).await
    }

    /// Every row of one organization, soft-deleted ones included.
    ///
    /// Ignores the ambient context; meant for administrative and
    /// background use only.
    pub async fn all_for_organization(&self, organization_id: OrganizationId) -> AppResult<Vec<E>> {
        self.fetch(ScopeFilter::Organization(organization_id), true)
            .await
    }

    async fn fetch(&self, filter: ScopeFilter, include_deleted: bool) -> AppResult<Vec<E>> {
        let entity = E::REGISTRATION.entity;

        if self.registry.lookup::<E>().is_none() {
            warn!(entity, "Scoped read of an unregistered entity type; returning nothing");
            return Ok(Vec::new());
        }

        if filter.is_nothing() {
            debug!(entity, "No tenant resolved for scoped read; returning nothing");
            return Ok(Vec::new());
        }

        self.source.fetch_scoped(&filter, include_deleted).await
    }
}
