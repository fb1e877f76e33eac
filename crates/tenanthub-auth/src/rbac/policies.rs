//! Role-to-capability mapping definitions.

use std::collections::HashMap;

use tenanthub_entity::membership::{Capabilities, Capability, Role};

/// Fixed mapping from each canonical role to the capabilities it starts with.
///
/// Consulted once, when a membership is first created. Aliases are
/// normalized before lookup; unknown roles get no capabilities.
/// `manage-federation` is never derived and must be granted explicitly.
#[derive(Debug, Clone)]
pub struct RolePolicies {
    /// Canonical role → derived capability set.
    policies: HashMap<Role, Capabilities>,
}

impl RolePolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        let mut policies = HashMap::new();

        let everything = Capabilities::from_slice(&[
            Capability::AdminAccess,
            Capability::ManageMembers,
            Capability::ManageVisitors,
            Capability::ManageActivities,
            Capability::ViewReports,
            Capability::ManageBranches,
        ]);
        policies.insert(Role::SuperAdmin, everything);
        policies.insert(Role::OrganizationAdmin, everything);

        policies.insert(
            Role::Pastor,
            Capabilities::from_slice(&[
                Capability::AdminAccess,
                Capability::ManageMembers,
                Capability::ManageVisitors,
                Capability::ManageActivities,
                Capability::ViewReports,
            ]),
        );

        policies.insert(
            Role::Secretary,
            Capabilities::from_slice(&[
                Capability::AdminAccess,
                Capability::ManageMembers,
                Capability::ManageVisitors,
                Capability::ViewReports,
            ]),
        );

        policies.insert(
            Role::Leader,
            Capabilities::from_slice(&[Capability::ManageVisitors, Capability::ManageActivities]),
        );

        policies.insert(Role::Member, Capabilities::none());

        Self { policies }
    }

    /// Derives the initial capability set for `role`.
    pub fn derive_capabilities(&self, role: &Role) -> Capabilities {
        self.policies
            .get(&role.normalize())
            .copied()
            .unwrap_or_default()
    }

    /// Checks whether `role` starts with `capability`.
    pub fn grants(&self, role: &Role, capability: Capability) -> bool {
        self.derive_capabilities(role).has(capability)
    }
}

impl Default for RolePolicies {
    fn default() -> Self {
        Self::new()
    }
}
