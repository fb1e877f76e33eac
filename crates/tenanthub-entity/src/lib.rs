//! # tenanthub-entity
//!
//! Domain entity models for TenantHub. Every row struct derives `Debug`,
//! `Clone`, `Serialize`, `Deserialize` and `sqlx::FromRow`. The crate also
//! holds the static scoping registrations of tenant-owned types and the
//! request-scoped [`context::TenantContext`].

pub mod context;
pub mod federation;
pub mod membership;
pub mod organization;
pub mod principal;
pub mod scoping;
pub mod subunit;

pub use context::{TenantContext, ambient};
pub use scoping::{OrganizationRef, ScopeOwner, ScopeRegistration, TenantScoped};
