//! Route handlers organized by domain.

pub mod context;
pub mod health;
pub mod membership;
pub mod subunit;
