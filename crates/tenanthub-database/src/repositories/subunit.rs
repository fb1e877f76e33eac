//! Sub-unit repository implementation.

use sqlx::PgPool;

use tenanthub_core::error::{AppError, ErrorKind};
use tenanthub_core::result::AppResult;
use tenanthub_core::types::{OrganizationId, SubunitId};
use tenanthub_entity::subunit::Subunit;

/// Repository for sub-unit lookups.
#[derive(Debug, Clone)]
pub struct SubunitRepository {
    pool: PgPool,
}

impl SubunitRepository {
    /// Create a new sub-unit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a sub-unit by primary key, soft-deleted ones included.
    pub async fn find_by_id(&self, id: SubunitId) -> AppResult<Option<Subunit>> {
        sqlx::query_as::<_, Subunit>("SELECT * FROM subunits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find sub-unit", e))
    }

    /// Non-deleted sub-units of an organization, main first, then by id.
    pub async fn find_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Subunit>> {
        sqlx::query_as::<_, Subunit>(
            "SELECT * FROM subunits WHERE organization_id = $1 AND deleted_at IS NULL \
             ORDER BY is_main DESC, id ASC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sub-units", e))
    }

    /// Insert a sub-unit.
    pub async fn create(&self, subunit: &Subunit) -> AppResult<Subunit> {
        sqlx::query_as::<_, Subunit>(
            "INSERT INTO subunits (id, organization_id, name, is_main, is_active, created_at, deleted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(subunit.id)
        .bind(subunit.organization_id)
        .bind(&subunit.name)
        .bind(subunit.is_main)
        .bind(subunit.is_active)
        .bind(subunit.created_at)
        .bind(subunit.deleted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create sub-unit", e))
    }
}
