//! Membership domain entities: the principal-to-organization relationship.

pub mod capability;
pub mod model;
pub mod role;
pub mod status;

pub use capability::{Capabilities, Capability};
pub use model::{Membership, NewMembership};
pub use role::Role;
pub use status::MembershipStatus;
