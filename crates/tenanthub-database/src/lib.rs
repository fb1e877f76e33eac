//! # tenanthub-database
//!
//! PostgreSQL connection management, the [`TenancyStore`] abstraction with
//! Postgres and in-memory implementations, and the tenant-scoped read path
//! every tenant-owned entity goes through.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod scoping;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryTenancyStore;
pub use postgres::PgTenancyStore;
pub use scoping::{ScopeFilter, ScopeRegistry, ScopedRepository, ScopedSource};
pub use store::TenancyStore;
