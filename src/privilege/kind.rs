//! Privilege kinds and their bitmask encoding

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single privilege kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Privilege {
    All,
    Create,
    Drop,
    Grant,
    Select,
    Insert,
    Delete,
    Update,
}

impl Privilege {
    /// Every kind, in declaration order.
    pub const BY_VALUE: [Privilege; 8] = [
        Privilege::All,
        Privilege::Create,
        Privilege::Drop,
        Privilege::Grant,
        Privilege::Select,
        Privilege::Insert,
        Privilege::Delete,
        Privilege::Update,
    ];

    pub fn mask(self) -> u32 {
        1 << (self as u32)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::All => "ALL",
            Privilege::Create => "CREATE",
            Privilege::Drop => "DROP",
            Privilege::Grant => "GRANT",
            Privilege::Select => "SELECT",
            Privilege::Insert => "INSERT",
            Privilege::Delete => "DELETE",
            Privilege::Update => "UPDATE",
        }
    }

    /// Returns true if `bits` has this privilege set.
    pub fn is_set_in(self, bits: u32) -> bool {
        bits & self.mask() != 0
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered list of privilege kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeList(pub Vec<Privilege>);

impl PrivilegeList {
    pub fn new(kinds: impl IntoIterator<Item = Privilege>) -> Self {
        Self(kinds.into_iter().collect())
    }

    pub fn to_bit_field(&self) -> u32 {
        self.0.iter().fold(0, |bits, p| bits | p.mask())
    }

    pub fn from_bit_field(bits: u32) -> Self {
        Self(
            Privilege::BY_VALUE
                .iter()
                .copied()
                .filter(|p| p.is_set_in(bits))
                .collect(),
        )
    }

    /// Comma-separated names sorted alphabetically.
    pub fn sorted_string(&self) -> String {
        let mut names: Vec<&str> = self.0.iter().map(|p| p.as_str()).collect();
        names.sort_unstable();
        names.join(",")
    }
}

impl fmt::Display for PrivilegeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|p| p.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}
