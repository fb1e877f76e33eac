//! JWT claims structure carried by access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenanthub_core::types::PrincipalId;
use tenanthub_entity::principal::Principal;

/// JWT claims payload identifying a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal ID.
    pub sub: PrincipalId,
    /// Login name.
    pub username: String,
    /// Platform superuser flag.
    #[serde(default)]
    pub is_superuser: bool,
    /// Platform staff flag.
    #[serde(default)]
    pub is_staff: bool,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID.
    pub jti: Uuid,
}

impl Claims {
    /// Returns the principal ID from the subject claim.
    pub fn principal_id(&self) -> PrincipalId {
        self.sub
    }

    /// Returns the principal described by these claims.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub,
            username: self.username.clone(),
            is_superuser: self.is_superuser,
            is_staff: self.is_staff,
        }
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
