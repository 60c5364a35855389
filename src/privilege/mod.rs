//! Privilege subsystem for kvsql
//!
//! Tracks which users may perform which operations on a table.
//!
//! # Rules
//!
//! - Users are kept sorted by name; lookups are binary searches
//! - `ALL` subsumes every other privilege
//! - The root user always holds `ALL` on user tables
//! - Descriptors are immutable values: `grant`/`revoke` return a new descriptor
//!
//! The planner never consults privileges. The engine checks `SELECT`
//! before handing a statement to the planner.

mod descriptor;
mod kind;

pub use descriptor::{PrivilegeDescriptor, PrivilegeError, UserPrivilegeString, UserPrivileges};
pub use kind::{Privilege, PrivilegeList};

/// The superuser name.
pub const ROOT_USER: &str = "root";
