//! Membership role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Level assigned to role values this build does not recognise.
pub const UNKNOWN_ROLE_LEVEL: u8 = u8::MAX;

/// Roles a principal can hold inside an organization.
///
/// Roles are totally ordered by privilege: SuperAdmin > OrganizationAdmin >
/// Pastor > Secretary > Leader > Member > anything unrecognised.
/// `LegacyFederationAdmin` is stored verbatim for historical records but
/// behaves exactly like `OrganizationAdmin` once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Platform-wide top-level role.
    SuperAdmin,
    /// Full administrator of one organization.
    OrganizationAdmin,
    /// Historical alias of `OrganizationAdmin`.
    LegacyFederationAdmin,
    /// Pastoral staff; everything except sub-unit management.
    Pastor,
    /// Office staff.
    Secretary,
    /// Ministry or group leader.
    Leader,
    /// Regular member with no administrative capabilities.
    Member,
    /// A role value written by another system or a newer release.
    Other(String),
}

impl Role {
    /// Resolve aliases to their canonical role. Idempotent.
    pub fn normalize(&self) -> Role {
        match self {
            Self::LegacyFederationAdmin => Self::OrganizationAdmin,
            other => other.clone(),
        }
    }

    /// Position in the hierarchy (lower = more privileged).
    pub fn hierarchy_level(&self) -> u8 {
        match self.normalize() {
            Self::SuperAdmin => 0,
            Self::OrganizationAdmin => 1,
            Self::Pastor => 2,
            Self::Secretary => 3,
            Self::Leader => 4,
            Self::Member => 5,
            Self::LegacyFederationAdmin | Self::Other(_) => UNKNOWN_ROLE_LEVEL,
        }
    }

    /// Check if this role is strictly more privileged than `other`.
    pub fn outranks(&self, other: &Role) -> bool {
        self.hierarchy_level() < other.hierarchy_level()
    }

    /// Check if this is the top-level role.
    pub fn is_top_level(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Check if this role is an organization admin after normalization.
    pub fn is_organization_admin(&self) -> bool {
        self.normalize() == Self::OrganizationAdmin
    }

    /// Check if this is the stored legacy alias.
    pub fn is_legacy_alias(&self) -> bool {
        matches!(self, Self::LegacyFederationAdmin)
    }

    /// Return the role as stored.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SuperAdmin => "super-admin",
            Self::OrganizationAdmin => "organization-admin",
            Self::LegacyFederationAdmin => "legacy-federation-admin",
            Self::Pastor => "pastor",
            Self::Secretary => "secretary",
            Self::Leader => "leader",
            Self::Member => "member",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Only the canonical spellings map to known roles. Anything else is kept
/// byte for byte as [`Role::Other`], so a stored value is written back
/// unchanged.
impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        match raw {
            "super-admin" => Self::SuperAdmin,
            "organization-admin" => Self::OrganizationAdmin,
            "legacy-federation-admin" => Self::LegacyFederationAdmin,
            "pastor" => Self::Pastor,
            "secretary" => Self::Secretary,
            "leader" => Self::Leader,
            "member" => Self::Member,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self::from)
    }
}
