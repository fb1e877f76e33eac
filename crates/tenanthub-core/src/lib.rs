//! # tenanthub-core
//!
//! Core crate for TenantHub. Contains configuration schemas, typed
//! identifiers for the tenancy model, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TenantHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
