//! Federation repository implementation.

use sqlx::PgPool;

use tenanthub_core::error::{AppError, ErrorKind};
use tenanthub_core::result::AppResult;
use tenanthub_core::types::FederationId;
use tenanthub_entity::federation::Federation;

/// Repository for federation lookups.
#[derive(Debug, Clone)]
pub struct FederationRepository {
    pool: PgPool,
}

impl FederationRepository {
    /// Create a new federation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a federation by primary key.
    pub async fn find_by_id(&self, id: FederationId) -> AppResult<Option<Federation>> {
        sqlx::query_as::<_, Federation>("SELECT * FROM federations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find federation", e)
            })
    }

    /// Insert a federation.
    pub async fn create(&self, federation: &Federation) -> AppResult<Federation> {
        sqlx::query_as::<_, Federation>(
            "INSERT INTO federations (id, name, created_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(federation.id)
        .bind(&federation.name)
        .bind(federation.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create federation", e))
    }
}
