//! Federation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tenanthub_core::types::FederationId;

/// An optional top-level grouping of organizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Federation {
    /// Unique federation identifier.
    pub id: FederationId,
    /// Display name.
    pub name: String,
    /// When the federation was created.
    pub created_at: DateTime<Utc>,
}

impl Federation {
    /// Create a new federation row.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FederationId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
