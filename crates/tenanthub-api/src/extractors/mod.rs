//! Custom Axum extractors.

pub mod auth;
pub mod tenant;

pub use auth::AuthUser;
pub use tenant::Tenant;
