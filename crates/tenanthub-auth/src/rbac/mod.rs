//! Role-based access control: capability derivation and tenant checks.

pub mod enforcer;
pub mod policies;

pub use enforcer::TenantEnforcer;
pub use policies::RolePolicies;
