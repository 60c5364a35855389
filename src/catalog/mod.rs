//! Schema catalog subsystem for kvsql
//!
//! Holds table, column and index metadata. The planner consumes catalog
//! snapshots read-only; it never owns or mutates descriptors.
//!
//! # Invariants
//!
//! - Index key column order and direction never change after creation
//! - The primary index is always present, unique, and listed first
//! - Secondary indexes carry the missing primary key columns as an implicit suffix
//! - Snapshots are immutable; every change publishes a new version

mod catalog;
mod descriptor;
mod errors;

pub use catalog::{Catalog, CatalogSnapshot, MemoryCatalog};
pub use descriptor::{
    names_match, ColumnDef, ColumnDescriptor, ColumnId, ColumnType, Direction, IndexColumn,
    IndexColumnDef, IndexDef, IndexDescriptor, IndexId, TableDef, TableDescriptor, TableId,
    PRIMARY_INDEX_ID, PRIMARY_INDEX_NAME,
};
pub use errors::{CatalogError, CatalogResult};
