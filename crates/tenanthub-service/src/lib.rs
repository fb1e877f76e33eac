//! # tenanthub-service
//!
//! Service layer for TenantHub: tenant resolution for each request and the
//! membership and sub-unit use cases built on top of it.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod membership;
pub mod subunit;
pub mod tenancy;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use membership::{CreateMembership, MembershipService, UpdateMembership};
pub use subunit::SubunitService;
pub use tenancy::{
    ActiveRelationship, ActiveRelationshipResolver, RequestContextResolver, RequestSignals,
};
