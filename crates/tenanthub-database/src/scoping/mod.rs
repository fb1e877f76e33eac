//! Tenant-scoped persistence.
//!
//! Reads of tenant-owned entities go through [`ScopedRepository`], which
//! derives a [`ScopeFilter`] from the ambient context and refuses to read
//! types missing from the startup [`ScopeRegistry`].

pub mod filter;
pub mod query;
pub mod registry;
pub mod repository;

pub use filter::ScopeFilter;
pub use query::scoped_select;
pub use registry::ScopeRegistry;
pub use repository::{ScopedRepository, ScopedSource};
