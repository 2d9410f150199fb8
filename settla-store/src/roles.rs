//! Role membership table: (role, principal) -> bool.

use settla_domain::{Address, Role};
use std::collections::{BTreeMap, BTreeSet};

/// Principals holding each role
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    members: BTreeMap<Role, BTreeSet<Address>>,
}

impl RoleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Check membership
    pub fn has(&self, role: Role, principal: Address) -> bool {
        self.members.get(&role).map(|m| m.contains(&principal)).unwrap_or(false)
    }

    /// Add a member. Returns `false` if it already held the role.
    pub fn grant(&mut self, role: Role, principal: Address) -> bool {
        self.members.entry(role).or_default().insert(principal)
    }

    /// Remove a member. Returns `false` if it did not hold the role.
    pub fn revoke(&mut self, role: Role, principal: Address) -> bool {
        match self.members.get_mut(&role) {
            Some(members) => members.remove(&principal),
            None => false,
        }
    }

    /// All holders of a role, ordered
    pub fn members(&self, role: Role) -> Vec<Address> {
        self.members.get(&role).map(|m| m.iter().copied().collect()).unwrap_or_default()
    }
}
