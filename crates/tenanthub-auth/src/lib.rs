//! # tenanthub-auth
//!
//! Principal identity and authorization for TenantHub.
//!
//! ## Modules
//!
//! - `jwt`: bearer token claims, issuing, and validation
//! - `rbac`: role-to-capability derivation and tenant management checks

pub mod jwt;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use rbac::{RolePolicies, TenantEnforcer};
