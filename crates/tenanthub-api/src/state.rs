//! Shared application state injected into all handlers via Axum's `State`.

use std::sync::Arc;

use tenanthub_auth::jwt::{JwtDecoder, JwtEncoder};
use tenanthub_auth::rbac::{RolePolicies, TenantEnforcer};
use tenanthub_core::config::AppConfig;
use tenanthub_database::{
    MemoryTenancyStore, PgTenancyStore, ScopeRegistry, ScopedRepository, ScopedSource,
    TenancyStore,
};
use tenanthub_entity::membership::Membership;
use tenanthub_entity::subunit::Subunit;
use tenanthub_service::{MembershipService, RequestContextResolver, SubunitService};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    // -- Configuration --
    /// Application configuration.
    pub config: Arc<AppConfig>,

    // -- Persistence --
    /// Tenancy store backing resolution and writes.
    pub store: Arc<dyn TenancyStore>,
    /// Scoping registrations of tenant-owned types.
    pub registry: Arc<ScopeRegistry>,

    // -- Auth --
    /// JWT issuer.
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT validator.
    pub jwt_decoder: Arc<JwtDecoder>,

    // -- Services --
    /// Per-request tenant resolution.
    pub context_resolver: Arc<RequestContextResolver>,
    /// Membership use cases.
    pub membership_service: Arc<MembershipService>,
    /// Sub-unit use cases.
    pub subunit_service: Arc<SubunitService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State backed by PostgreSQL.
    pub fn postgres(config: AppConfig, store: PgTenancyStore) -> Self {
        let subunits: Arc<dyn ScopedSource<Subunit>> = Arc::new(store.scoped_source::<Subunit>());
        let memberships: Arc<dyn ScopedSource<Membership>> =
            Arc::new(store.scoped_source::<Membership>());
        Self::assemble(config, Arc::new(store), subunits, memberships)
    }

    /// State backed by the in-process store.
    pub fn memory(config: AppConfig, store: MemoryTenancyStore) -> Self {
        let subunits: Arc<dyn ScopedSource<Subunit>> = Arc::new(store.clone());
        let memberships: Arc<dyn ScopedSource<Membership>> = Arc::new(store.clone());
        Self::assemble(config, Arc::new(store), subunits, memberships)
    }

    fn assemble(
        config: AppConfig,
        store: Arc<dyn TenancyStore>,
        subunits: Arc<dyn ScopedSource<Subunit>>,
        memberships: Arc<dyn ScopedSource<Membership>>,
    ) -> Self {
        let registry = Arc::new(ScopeRegistry::with_defaults());
        let policies = Arc::new(RolePolicies::new());
        let enforcer = Arc::new(TenantEnforcer::new());

        let membership_service = Arc::new(MembershipService::new(
            Arc::clone(&store),
            policies,
            Arc::clone(&enforcer),
            ScopedRepository::new(memberships, Arc::clone(&registry)),
        ));
        let subunit_service = Arc::new(SubunitService::new(
            Arc::clone(&store),
            enforcer,
            ScopedRepository::new(subunits, Arc::clone(&registry)),
        ));

        Self {
            jwt_encoder: Arc::new(JwtEncoder::new(&config.auth)),
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            context_resolver: Arc::new(RequestContextResolver::new(Arc::clone(&store))),
            config: Arc::new(config),
            store,
            registry,
            membership_service,
            subunit_service,
        }
    }
}
