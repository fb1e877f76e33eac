//! Tenant resolution configuration.

use serde::{Deserialize, Serialize};

/// Names of the request headers that override the resolved tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Header carrying an organization override.
    #[serde(default = "default_organization_header")]
    pub organization_header: String,
    /// Header carrying a sub-unit override (only read together with the
    /// organization header).
    #[serde(default = "default_subunit_header")]
    pub subunit_header: String,
    /// Header carrying a federation override.
    #[serde(default = "default_federation_header")]
    pub federation_header: String,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            organization_header: default_organization_header(),
            subunit_header: default_subunit_header(),
            federation_header: default_federation_header(),
        }
    }
}

fn default_organization_header() -> String {
    "X-Organization".to_string()
}

fn default_subunit_header() -> String {
    "X-Subunit".to_string()
}

fn default_federation_header() -> String {
    "X-Federation-Id".to_string()
}
