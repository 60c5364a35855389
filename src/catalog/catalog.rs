//! Versioned in-memory catalog
//!
//! Every DDL operation builds a new table map and publishes it as a new
//! snapshot. Readers keep whatever snapshot they started with, so a planning
//! call never observes a half-applied change.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::descriptor::{IndexDescriptor, TableDef, TableDescriptor, TableId};
use super::errors::{CatalogError, CatalogResult};
use crate::privilege::PrivilegeDescriptor;

/// Read-only catalog interface consumed by the planner.
pub trait Catalog {
    /// Looks up a table by name.
    fn get_table(&self, name: &str) -> CatalogResult<&TableDescriptor>;

    /// Returns every index of a table, primary first.
    fn indexes(&self, table: &str) -> CatalogResult<Vec<&IndexDescriptor>> {
        Ok(self.get_table(table)?.all_indexes().collect())
    }
}

fn table_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Immutable view of the catalog at one version.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    version: u64,
    tables: Arc<BTreeMap<String, Arc<TableDescriptor>>>,
}

impl CatalogSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.values().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Catalog for CatalogSnapshot {
    fn get_table(&self, name: &str) -> CatalogResult<&TableDescriptor> {
        self.tables
            .get(&table_key(name))
            .map(|t| t.as_ref())
            .ok_or_else(|| CatalogError::TableNotFound(name.to_string()))
    }
}

/// Owner of the current catalog version.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    current: CatalogSnapshot,
    next_table_id: TableId,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            current: CatalogSnapshot::default(),
            next_table_id: 1,
        }
    }

    /// Returns the current snapshot. Cheap: only reference counts move.
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.current.clone()
    }

    /// Creates a table and publishes a new catalog version.
    pub fn create_table(&mut self, def: &TableDef) -> CatalogResult<Arc<TableDescriptor>> {
        let key = table_key(&def.name);
        if self.current.tables.contains_key(&key) {
            return Err(CatalogError::TableExists(def.name.clone()));
        }

        let table = Arc::new(TableDescriptor::from_def(self.next_table_id, def)?);
        self.next_table_id += 1;

        let mut tables = self.current.tables.as_ref().clone();
        tables.insert(key, Arc::clone(&table));
        self.publish(tables);

        Ok(table)
    }

    /// Replaces a table's privileges and publishes a new catalog version.
    pub fn set_privileges(
        &mut self,
        table: &str,
        privileges: PrivilegeDescriptor,
    ) -> CatalogResult<Arc<TableDescriptor>> {
        let current = self.current.get_table(table)?;
        let updated = Arc::new(current.with_privileges(privileges)?);

        let mut tables = self.current.tables.as_ref().clone();
        tables.insert(table_key(table), Arc::clone(&updated));
        self.publish(tables);

        Ok(updated)
    }

    fn publish(&mut self, tables: BTreeMap<String, Arc<TableDescriptor>>) {
        self.current = CatalogSnapshot {
            version: self.current.version + 1,
            tables: Arc::new(tables),
        };
    }
}
