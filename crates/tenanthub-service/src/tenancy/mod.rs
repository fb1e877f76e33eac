//! Tenant resolution: which organization and sub-unit a request acts as.

pub mod active;
pub mod request;

pub use active::{ActiveRelationship, ActiveRelationshipResolver};
pub use request::{RequestContextResolver, RequestSignals};
