//! Membership lifecycle service.

pub mod service;

#[cfg(test)]
mod tests;

pub use service::{CreateMembership, MembershipService, UpdateMembership};
