//! Startup-time table of the entity types that may be read through the
//! scoped persistence layer.

use std::collections::HashMap;

use tracing::debug;

use tenanthub_entity::membership::Membership;
use tenanthub_entity::subunit::Subunit;
use tenanthub_entity::{ScopeRegistration, TenantScoped};

/// Registry of scoped entity types, keyed by entity name.
///
/// Built once at startup and shared read-only. A type that was never
/// registered is treated as unreadable by the scoped layer.
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    entries: HashMap<&'static str, ScopeRegistration>,
}

impl ScopeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with every tenant-owned type of this crate set.
    pub fn with_defaults() -> Self {
        Self::new().register::<Subunit>().register::<Membership>()
    }

    /// Add `E`'s static registration.
    pub fn register<E: TenantScoped>(mut self) -> Self {
        let registration = E::REGISTRATION;
        debug!(
            entity = registration.entity,
            table = registration.table,
            column = registration.reference.column(),
            "Registered tenant-scoped entity"
        );
        self.entries.insert(registration.entity, registration);
        self
    }

    /// The registration for `E`, if `E` was registered.
    pub fn lookup<E: TenantScoped>(&self) -> Option<&ScopeRegistration> {
        self.entries
            .get(E::REGISTRATION.entity)
            .filter(|registered| **registered == E::REGISTRATION)
    }

    /// Names of all registered entities, sorted.
    pub fn entities(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
