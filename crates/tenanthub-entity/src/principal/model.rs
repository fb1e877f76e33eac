//! Principal model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tenanthub_core::types::PrincipalId;

/// An authenticated actor as reported by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Principal {
    /// Unique principal identifier.
    pub id: PrincipalId,
    /// Login name.
    pub username: String,
    /// Platform superuser flag.
    pub is_superuser: bool,
    /// Platform staff flag.
    pub is_staff: bool,
}

impl Principal {
    /// Check whether the identity layer marks this principal as elevated.
    ///
    /// This does not look at memberships; a top-level membership role also
    /// elevates a caller but is checked where memberships are at hand.
    pub fn is_platform_elevated(&self) -> bool {
        self.is_superuser || self.is_staff
    }
}
