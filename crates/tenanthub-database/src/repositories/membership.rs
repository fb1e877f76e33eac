//! Membership repository implementation.

use sqlx::PgPool;

use tenanthub_core::error::{AppError, ErrorKind};
use tenanthub_core::result::AppResult;
use tenanthub_core::types::{MembershipId, OrganizationId, PrincipalId, SubunitId};
use tenanthub_entity::membership::Membership;

/// Repository for membership reads and writes.
///
/// Cross-organization sub-unit references are rejected by the
/// `memberships_subunit_same_org` trigger; this repository maps that
/// rejection to a validation error.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    /// Create a new membership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a membership by primary key.
    pub async fn find_by_id(&self, id: MembershipId) -> AppResult<Option<Membership>> {
        sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find membership", e)
            })
    }

    /// Find the membership joining a principal and an organization.
    pub async fn find_for(
        &self,
        principal_id: PrincipalId,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Membership>> {
        sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE principal_id = $1 AND organization_id = $2",
        )
        .bind(principal_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find membership", e))
    }

    /// All memberships of a principal, ordered by creation time then id.
    pub async fn find_by_principal(&self, principal_id: PrincipalId) -> AppResult<Vec<Membership>> {
        sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE principal_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list memberships", e)
        })
    }

    /// Insert a membership.
    pub async fn create(&self, m: &Membership) -> AppResult<Membership> {
        sqlx::query_as::<_, Membership>(
            "INSERT INTO memberships (id, principal_id, organization_id, role, \
             admin_access, manage_members, manage_visitors, manage_activities, \
             view_reports, manage_branches, manage_federation, \
             status, is_active, active_subunit_id, delegated_subunits, \
             created_at, updated_at, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             RETURNING *",
        )
        .bind(m.id)
        .bind(m.principal_id)
        .bind(m.organization_id)
        .bind(&m.role)
        .bind(m.capabilities.admin_access)
        .bind(m.capabilities.manage_members)
        .bind(m.capabilities.manage_visitors)
        .bind(m.capabilities.manage_activities)
        .bind(m.capabilities.view_reports)
        .bind(m.capabilities.manage_branches)
        .bind(m.capabilities.manage_federation)
        .bind(m.status)
        .bind(m.is_active)
        .bind(m.active_subunit_id)
        .bind(&m.delegated_subunits)
        .bind(m.created_at)
        .bind(m.updated_at)
        .bind(m.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to create membership"))
    }

    /// Persist the mutable fields of a membership.
    ///
    /// `is_active` can be cleared here but never set; use
    /// [`MembershipRepository::activate`] for that.
    pub async fn update(&self, m: &Membership) -> AppResult<Membership> {
        sqlx::query_as::<_, Membership>(
            "UPDATE memberships SET role = $2, \
             admin_access = $3, manage_members = $4, manage_visitors = $5, \
             manage_activities = $6, view_reports = $7, manage_branches = $8, \
             manage_federation = $9, status = $10, active_subunit_id = $11, \
             delegated_subunits = $12, is_active = is_active AND $13, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(m.id)
        .bind(&m.role)
        .bind(m.capabilities.admin_access)
        .bind(m.capabilities.manage_members)
        .bind(m.capabilities.manage_visitors)
        .bind(m.capabilities.manage_activities)
        .bind(m.capabilities.view_reports)
        .bind(m.capabilities.manage_branches)
        .bind(m.capabilities.manage_federation)
        .bind(m.status)
        .bind(m.active_subunit_id)
        .bind(&m.delegated_subunits)
        .bind(m.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to update membership"))?
        .ok_or_else(|| AppError::not_found(format!("Membership {} not found", m.id)))
    }

    /// Make a membership the principal's only active one.
    ///
    /// Both statements run in one transaction so no reader ever sees two
    /// active memberships for the same principal.
    pub async fn activate(&self, id: MembershipId) -> AppResult<Membership> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let principal_id: Option<PrincipalId> =
            sqlx::query_scalar("SELECT principal_id FROM memberships WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to lock membership", e)
                })?;
        let principal_id =
            principal_id.ok_or_else(|| AppError::not_found(format!("Membership {id} not found")))?;

        sqlx::query(
            "UPDATE memberships SET is_active = FALSE, updated_at = NOW() \
             WHERE principal_id = $1 AND id <> $2 AND is_active",
        )
        .bind(principal_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to deactivate memberships", e)
        })?;

        let membership = sqlx::query_as::<_, Membership>(
            "UPDATE memberships SET is_active = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to activate membership"))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit activation", e)
        })?;

        Ok(membership)
    }

    /// Store or clear the cached active sub-unit.
    ///
    /// A sub-unit outside the membership's organization leaves the row
    /// untouched and fails with a validation error.
    pub async fn set_active_subunit(
        &self,
        id: MembershipId,
        subunit_id: Option<SubunitId>,
    ) -> AppResult<Membership> {
        let updated = sqlx::query_as::<_, Membership>(
            "UPDATE memberships m SET active_subunit_id = $2, updated_at = NOW() \
             WHERE m.id = $1 AND ($2::uuid IS NULL OR EXISTS ( \
                 SELECT 1 FROM subunits s \
                 WHERE s.id = $2 AND s.organization_id = m.organization_id)) \
             RETURNING *",
        )
        .bind(id)
        .bind(subunit_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to set active sub-unit"))?;

        if let Some(membership) = updated {
            return Ok(membership);
        }

        match self.find_by_id(id).await? {
            None => Err(AppError::not_found(format!("Membership {id} not found"))),
            Some(_) => Err(AppError::validation(format!(
                "Sub-unit does not belong to the organization of membership {id}"
            ))),
        }
    }
}

/// Map constraint violations on membership writes to domain errors.
fn map_write_error(err: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::with_source(
                ErrorKind::Conflict,
                "A membership for this principal and organization already exists",
                err,
            );
        }
        if db.is_foreign_key_violation() {
            return AppError::with_source(
                ErrorKind::Validation,
                "Membership references an unknown principal, organization or sub-unit",
                err,
            );
        }
        if db.is_check_violation() {
            return AppError::with_source(
                ErrorKind::Validation,
                "Active sub-unit must belong to the membership's organization",
                err,
            );
        }
    }
    AppError::with_source(ErrorKind::Database, message, err)
}
