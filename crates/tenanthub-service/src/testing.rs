//! Shared fixtures for service tests.

use std::sync::Arc;

use tenanthub_auth::rbac::{RolePolicies, TenantEnforcer};
use tenanthub_core::types::PrincipalId;
use tenanthub_database::{MemoryTenancyStore, ScopeRegistry, ScopedRepository, TenancyStore};
use tenanthub_entity::federation::Federation;
use tenanthub_entity::membership::{Membership, NewMembership, Role};
use tenanthub_entity::organization::Organization;
use tenanthub_entity::principal::Principal;
use tenanthub_entity::subunit::Subunit;

use crate::context::RequestContext;
use crate::membership::MembershipService;
use crate::subunit::SubunitService;

pub(crate) struct Fixture {
    pub store: MemoryTenancyStore,
    pub policies: RolePolicies,
    pub memberships: MembershipService,
    pub subunits: SubunitService,
}

impl Fixture {
    pub fn new() -> Self {
        let store = MemoryTenancyStore::new();
        let shared: Arc<dyn TenancyStore> = Arc::new(store.clone());
        let registry = Arc::new(ScopeRegistry::with_defaults());
        let enforcer = Arc::new(TenantEnforcer::new());
        let policies = Arc::new(RolePolicies::new());

        let memberships = MembershipService::new(
            Arc::clone(&shared),
            Arc::clone(&policies),
            Arc::clone(&enforcer),
            ScopedRepository::new(Arc::new(store.clone()), Arc::clone(&registry)),
        );
        let subunits = SubunitService::new(
            shared,
            enforcer,
            ScopedRepository::new(Arc::new(store.clone()), registry),
        );

        Self {
            store,
            policies: RolePolicies::new(),
            memberships,
            subunits,
        }
    }

    pub async fn federation(&self, name: &str) -> Federation {
        self.store.insert_federation(Federation::new(name)).await
    }

    pub async fn organization(&self, name: &str, federation: Option<&Federation>) -> Organization {
        self.store
            .insert_organization(Organization::new(name, federation.map(|f| f.id)))
            .await
            .unwrap()
    }

    pub async fn subunit(&self, organization: &Organization, name: &str, is_main: bool) -> Subunit {
        self.store
            .insert_subunit(Subunit::new(organization.id, name, is_main))
            .await
            .unwrap()
    }

    /// Seed a membership directly, bypassing the service's checks.
    pub async fn seed(
        &self,
        principal: &Principal,
        organization: &Organization,
        role: Role,
    ) -> Membership {
        let membership = Membership::from_new(NewMembership {
            principal_id: principal.id,
            organization_id: organization.id,
            capabilities: self.policies.derive_capabilities(&role),
            role,
            active_subunit_id: None,
            delegated_subunits: Vec::new(),
            created_by: None,
        });
        self.store.insert_membership(&membership).await.unwrap()
    }
}

pub(crate) fn principal(username: &str) -> Principal {
    Principal {
        id: PrincipalId::new(),
        username: username.to_string(),
        is_superuser: false,
        is_staff: false,
    }
}

pub(crate) fn superuser(username: &str) -> Principal {
    Principal {
        is_superuser: true,
        ..principal(username)
    }
}

pub(crate) fn actor(principal: &Principal) -> RequestContext {
    RequestContext::detached(principal.clone())
}
