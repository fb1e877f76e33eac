//! Sub-unit entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tenanthub_core::types::{OrganizationId, SubunitId};

/// A location under exactly one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Subunit {
    /// Unique sub-unit identifier.
    pub id: SubunitId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Whether this is the organization's main sub-unit.
    pub is_main: bool,
    /// Whether the sub-unit is active.
    pub is_active: bool,
    /// When the sub-unit was created.
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Subunit {
    /// Create a new, active sub-unit row.
    pub fn new(organization_id: OrganizationId, name: impl Into<String>, is_main: bool) -> Self {
        Self {
            id: SubunitId::new(),
            organization_id,
            name: name.into(),
            is_main,
            is_active: true,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Check if the sub-unit is active and not soft-deleted.
    pub fn is_usable(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

/// Order sub-units main first, then by id ascending.
pub fn sort_main_first(subunits: &mut [Subunit]) {
    subunits.sort_by(|a, b| b.is_main.cmp(&a.is_main).then(a.id.cmp(&b.id)));
}
