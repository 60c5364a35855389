//! Per-object privilege descriptor
//!
//! Users are stored sorted by name. Every mutation builds a new descriptor
//! rather than editing the list in place, so a descriptor held by a catalog
//! snapshot never changes underneath a reader.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::kind::{Privilege, PrivilegeList};
use super::ROOT_USER;

/// Privileges held by a single user, as a bit field of [`Privilege`] masks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPrivileges {
    pub user: String,
    pub privileges: u32,
}

/// `(user, "PRIV1,PRIV2")` pair produced by [`PrivilegeDescriptor::show`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPrivilegeString {
    pub user: String,
    pub privileges: String,
}

/// Descriptor validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrivilegeError {
    #[error("user {0} does not have privileges")]
    MissingUser(String),

    #[error("user {0} does not have ALL privileges")]
    MissingAll(String),

    #[error("user {user} must have {privileges} privileges on system objects")]
    SystemPrivilegesMissing { user: String, privileges: String },

    #[error("user {user} must not have {privileges} privileges on system objects")]
    SystemPrivilegesExcess { user: String, privileges: String },
}

/// Sorted list of users and the privileges they hold on one object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeDescriptor {
    users: Vec<UserPrivileges>,
}

fn system_allowed() -> u32 {
    Privilege::Select.mask() | Privilege::Grant.mask()
}

impl PrivilegeDescriptor {
    /// Read-only descriptor for system tables: root holds SELECT and GRANT.
    pub fn system_object() -> Self {
        Self {
            users: vec![UserPrivileges {
                user: ROOT_USER.to_string(),
                privileges: system_allowed(),
            }],
        }
    }

    /// Descriptor for user tables: root holds ALL.
    pub fn default_object() -> Self {
        Self {
            users: vec![UserPrivileges {
                user: ROOT_USER.to_string(),
                privileges: Privilege::All.mask(),
            }],
        }
    }

    pub fn users(&self) -> &[UserPrivileges] {
        &self.users
    }

    fn search(&self, user: &str) -> Result<usize, usize> {
        self.users.binary_search_by(|u| u.user.as_str().cmp(user))
    }

    fn find_user(&self, user: &str) -> Option<&UserPrivileges> {
        self.search(user).ok().map(|idx| &self.users[idx])
    }

    /// Returns a descriptor with `privileges` added for `user`.
    ///
    /// Granting anything to a user that already holds ALL is a no-op;
    /// granting ALL replaces whatever the user held.
    pub fn grant(&self, user: &str, privileges: &PrivilegeList) -> Self {
        let mut users = self.users.clone();
        let idx = match self.search(user) {
            Ok(idx) => idx,
            Err(idx) => {
                users.insert(
                    idx,
                    UserPrivileges {
                        user: user.to_string(),
                        privileges: 0,
                    },
                );
                idx
            }
        };

        let entry = &mut users[idx];
        if Privilege::All.is_set_in(entry.privileges) {
            return Self { users };
        }

        let bits = privileges.to_bit_field();
        if Privilege::All.is_set_in(bits) {
            entry.privileges = Privilege::All.mask();
        } else {
            entry.privileges |= bits;
        }

        Self { users }
    }

    /// Returns a descriptor with `privileges` removed from `user`.
    ///
    /// Revoking ALL drops the user entirely. Revoking a single privilege from
    /// an ALL holder first expands ALL into the individual kinds. A user left
    /// with nothing is removed.
    pub fn revoke(&self, user: &str, privileges: &PrivilegeList) -> Self {
        let idx = match self.search(user) {
            Ok(idx) if self.users[idx].privileges != 0 => idx,
            _ => return self.clone(),
        };

        let mut users = self.users.clone();
        let bits = privileges.to_bit_field();
        if Privilege::All.is_set_in(bits) {
            users.remove(idx);
            return Self { users };
        }

        let entry = &mut users[idx];
        if Privilege::All.is_set_in(entry.privileges) {
            entry.privileges = Privilege::BY_VALUE
                .iter()
                .filter(|p| **p != Privilege::All)
                .fold(0, |acc, p| acc | p.mask());
        }

        entry.privileges &= !bits;
        if entry.privileges == 0 {
            users.remove(idx);
        }

        Self { users }
    }

    /// Returns true if `user` holds `privilege` (or ALL).
    pub fn check(&self, user: &str, privilege: Privilege) -> bool {
        match self.find_user(user) {
            Some(entry) => {
                Privilege::All.is_set_in(entry.privileges) || privilege.is_set_in(entry.privileges)
            }
            None => false,
        }
    }

    /// Validates the descriptor before it is written to the catalog.
    pub fn validate(&self, is_system: bool) -> Result<(), PrivilegeError> {
        let root = self
            .find_user(ROOT_USER)
            .ok_or_else(|| PrivilegeError::MissingUser(ROOT_USER.to_string()))?;

        if !is_system {
            if !Privilege::All.is_set_in(root.privileges) {
                return Err(PrivilegeError::MissingAll(ROOT_USER.to_string()));
            }
            return Ok(());
        }

        let allowed = system_allowed();
        if root.privileges & allowed != allowed {
            return Err(PrivilegeError::SystemPrivilegesMissing {
                user: ROOT_USER.to_string(),
                privileges: PrivilegeList::from_bit_field(allowed).to_string(),
            });
        }

        for entry in &self.users {
            let remaining = entry.privileges & !allowed;
            if remaining != 0 {
                return Err(PrivilegeError::SystemPrivilegesExcess {
                    user: entry.user.clone(),
                    privileges: PrivilegeList::from_bit_field(remaining).to_string(),
                });
            }
        }

        Ok(())
    }

    /// Lists users with their privileges as sorted, comma-separated names.
    pub fn show(&self) -> Vec<UserPrivilegeString> {
        self.users
            .iter()
            .map(|entry| UserPrivilegeString {
                user: entry.user.clone(),
                privileges: PrivilegeList::from_bit_field(entry.privileges).sorted_string(),
            })
            .collect()
    }
}
