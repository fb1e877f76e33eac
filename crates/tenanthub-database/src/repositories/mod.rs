//! PostgreSQL repositories for the tenancy tables.

pub mod federation;
pub mod membership;
pub mod organization;
pub mod subunit;

pub use federation::FederationRepository;
pub use membership::MembershipRepository;
pub use organization::OrganizationRepository;
pub use subunit::SubunitRepository;
