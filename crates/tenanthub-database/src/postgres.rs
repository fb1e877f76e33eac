//! PostgreSQL implementation of the tenancy store and scoped reads.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgRow;

use tenanthub_core::error::{AppError, ErrorKind};
use tenanthub_core::result::AppResult;
use tenanthub_core::types::{FederationId, MembershipId, OrganizationId, PrincipalId, SubunitId};
use tenanthub_entity::TenantScoped;
use tenanthub_entity::federation::Federation;
use tenanthub_entity::membership::Membership;
use tenanthub_entity::organization::Organization;
use tenanthub_entity::subunit::Subunit;

use crate::connection::DatabasePool;
use crate::repositories::{
    FederationRepository, MembershipRepository, OrganizationRepository, SubunitRepository,
};
use crate::scoping::{ScopeFilter, ScopedSource, scoped_select};
use crate::store::TenancyStore;

/// [`TenancyStore`] backed by the tenancy tables in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgTenancyStore {
    pool: PgPool,
    federations: FederationRepository,
    organizations: OrganizationRepository,
    subunits: SubunitRepository,
    memberships: MembershipRepository,
}

impl PgTenancyStore {
    /// Build the store over an open pool.
    pub fn new(db: &DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            federations: FederationRepository::new(pool.clone()),
            organizations: OrganizationRepository::new(pool.clone()),
            subunits: SubunitRepository::new(pool.clone()),
            memberships: MembershipRepository::new(pool.clone()),
            pool,
        }
    }

    /// Scoped reader for any registered entity stored in this database.
    pub fn scoped_source<E>(&self) -> PgScopedSource<E>
    where
        E: TenantScoped + for<'r> sqlx::FromRow<'r, PgRow>,
    {
        PgScopedSource::new(self.pool.clone())
    }

    /// Federation repository.
    pub fn federations(&self) -> &FederationRepository {
        &self.federations
    }

    /// Organization repository.
    pub fn organizations(&self) -> &OrganizationRepository {
        &self.organizations
    }

    /// Sub-unit repository.
    pub fn subunits(&self) -> &SubunitRepository {
        &self.subunits
    }
}

#[async_trait]
impl TenancyStore for PgTenancyStore {
    async fn find_federation(&self, id: FederationId) -> AppResult<Option<Federation>> {
        self.federations.find_by_id(id).await
    }

    async fn find_organization(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        self.organizations.find_by_id(id).await
    }

    async fn find_subunit(&self, id: SubunitId) -> AppResult<Option<Subunit>> {
        self.subunits.find_by_id(id).await
    }

    async fn subunits_of(&self, organization_id: OrganizationId) -> AppResult<Vec<Subunit>> {
        self.subunits.find_by_organization(organization_id).await
    }

    async fn find_membership(&self, id: MembershipId) -> AppResult<Option<Membership>> {
        self.memberships.find_by_id(id).await
    }

    async fn find_membership_for(
        &self,
        principal_id: PrincipalId,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Membership>> {
        self.memberships.find_for(principal_id, organization_id).await
    }

    async fn memberships_of(&self, principal_id: PrincipalId) -> AppResult<Vec<Membership>> {
        self.memberships.find_by_principal(principal_id).await
    }

    async fn insert_membership(&self, membership: &Membership) -> AppResult<Membership> {
        self.memberships.create(membership).await
    }

    async fn update_membership(&self, membership: &Membership) -> AppResult<Membership> {
        self.memberships.update(membership).await
    }

    async fn activate_membership(&self, id: MembershipId) -> AppResult<Membership> {
        self.memberships.activate(id).await
    }

    async fn set_active_subunit(
        &self,
        id: MembershipId,
        subunit_id: Option<SubunitId>,
    ) -> AppResult<Membership> {
        self.memberships.set_active_subunit(id, subunit_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        let row: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))?;
        Ok(row.0 == 1)
    }
}

/// Scoped reads of `E` through generated SQL.
pub struct PgScopedSource<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgScopedSource<E> {
    /// Create a scoped source over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E> ScopedSource<E> for PgScopedSource<E>
where
    E: TenantScoped + for<'r> sqlx::FromRow<'r, PgRow>,
{
    async fn fetch_scoped(&self, filter: &ScopeFilter, include_deleted: bool) -> AppResult<Vec<E>> {
        let registration = E::REGISTRATION;
        let mut query = scoped_select(&registration, filter, include_deleted);
        query
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to load scoped {} rows", registration.entity),
                    e,
                )
            })
    }
}
