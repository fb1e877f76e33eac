//! Core type definitions used across the TenantHub workspace.

pub mod id;

pub use id::*;
