//! Organization entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tenanthub_core::types::{FederationId, OrganizationId};

/// A tenant. Every tenant-owned row references exactly one organization,
/// directly or through one of its sub-units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: OrganizationId,
    /// The federation this organization belongs to, if any.
    pub federation_id: Option<FederationId>,
    /// Display name.
    pub name: String,
    /// Whether the organization is active.
    pub is_active: bool,
    /// When the organization was created.
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Create a new, active organization row.
    pub fn new(name: impl Into<String>, federation_id: Option<FederationId>) -> Self {
        Self {
            id: OrganizationId::new(),
            federation_id,
            name: name.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Check whether both organizations sit under the same federation.
    ///
    /// Organizations without a federation never share one.
    pub fn shares_federation_with(&self, other: &Organization) -> bool {
        match (self.federation_id, other.federation_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
