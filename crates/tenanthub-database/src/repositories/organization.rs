//! Organization repository implementation.

use sqlx::PgPool;

use tenanthub_core::error::{AppError, ErrorKind};
use tenanthub_core::result::AppResult;
use tenanthub_core::types::{FederationId, OrganizationId};
use tenanthub_entity::organization::Organization;

/// Repository for organization lookups.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an organization by primary key.
    pub async fn find_by_id(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find organization", e)
            })
    }

    /// List the organizations of a federation.
    pub async fn find_by_federation(
        &self,
        federation_id: FederationId,
    ) -> AppResult<Vec<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE federation_id = $1 ORDER BY name ASC, id ASC",
        )
        .bind(federation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to list organizations of federation",
                e,
            )
        })
    }

    /// Insert an organization.
    pub async fn create(&self, organization: &Organization) -> AppResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (id, federation_id, name, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(organization.id)
        .bind(organization.federation_id)
        .bind(&organization.name)
        .bind(organization.is_active)
        .bind(organization.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create organization", e)
        })
    }
}
