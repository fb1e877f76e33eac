//! Capability flags carried by a membership.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single capability a membership can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Access to the administrative surface.
    AdminAccess,
    /// Create and edit member records.
    ManageMembers,
    /// Create and edit visitor records.
    ManageVisitors,
    /// Create and edit activities.
    ManageActivities,
    /// Read aggregated reports.
    ViewReports,
    /// Manage sub-units (branches).
    ManageBranches,
    /// Manage sibling organizations inside the same federation.
    ManageFederation,
}

impl Capability {
    /// Every capability, in column order.
    pub const ALL: [Capability; 7] = [
        Self::AdminAccess,
        Self::ManageMembers,
        Self::ManageVisitors,
        Self::ManageActivities,
        Self::ViewReports,
        Self::ManageBranches,
        Self::ManageFederation,
    ];
}

/// The set of capability flags stored on a membership row.
///
/// One boolean column per capability; read with [`Capabilities::has`]
/// rather than by field name so call sites stay typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromRow)]
pub struct Capabilities {
    /// See [`Capability::AdminAccess`].
    pub admin_access: bool,
    /// See [`Capability::ManageMembers`].
    pub manage_members: bool,
    /// See [`Capability::ManageVisitors`].
    pub manage_visitors: bool,
    /// See [`Capability::ManageActivities`].
    pub manage_activities: bool,
    /// See [`Capability::ViewReports`].
    pub view_reports: bool,
    /// See [`Capability::ManageBranches`].
    pub manage_branches: bool,
    /// See [`Capability::ManageFederation`].
    pub manage_federation: bool,
}

impl Capabilities {
    /// A set with no capability granted.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a set from the listed capabilities.
    pub fn from_slice(granted: &[Capability]) -> Self {
        let mut caps = Self::none();
        for capability in granted {
            caps.set(*capability, true);
        }
        caps
    }

    /// Check a single capability.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::AdminAccess => self.admin_access,
            Capability::ManageMembers => self.manage_members,
            Capability::ManageVisitors => self.manage_visitors,
            Capability::ManageActivities => self.manage_activities,
            Capability::ViewReports => self.view_reports,
            Capability::ManageBranches => self.manage_branches,
            Capability::ManageFederation => self.manage_federation,
        }
    }

    /// Grant or revoke a single capability.
    pub fn set(&mut self, capability: Capability, value: bool) {
        let slot = match capability {
            Capability::AdminAccess => &mut self.admin_access,
            Capability::ManageMembers => &mut self.manage_members,
            Capability::ManageVisitors => &mut self.manage_visitors,
            Capability::ManageActivities => &mut self.manage_activities,
            Capability::ViewReports => &mut self.view_reports,
            Capability::ManageBranches => &mut self.manage_branches,
            Capability::ManageFederation => &mut self.manage_federation,
        };
        *slot = value;
    }

    /// The granted capabilities, in column order.
    pub fn granted(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }
}
