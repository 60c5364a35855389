//! Table, column and index descriptors
//!
//! Descriptors are built once from a [`TableDef`] and never mutated. Key
//! column order and per-column direction are fixed at creation.
//!
//! Secondary indexes are logically extended with the primary key columns
//! they do not already contain (the implicit suffix), which makes every index
//! entry unique.

use serde::{Deserialize, Serialize};

use super::errors::{CatalogError, CatalogResult};
use crate::privilege::PrivilegeDescriptor;

pub type TableId = u32;
pub type IndexId = u32;
pub type ColumnId = u32;

/// Name of the implicit primary index.
pub const PRIMARY_INDEX_NAME: &str = "primary";
/// Id of the implicit primary index on every table.
pub const PRIMARY_INDEX_ID: IndexId = 1;

/// Semantic column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    String,
    Bool,
}

/// Sort direction of an index column or an ORDER BY term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "asc", alias = "ASC")]
    Ascending,
    #[serde(rename = "desc", alias = "DESC")]
    Descending,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    /// `+` for ascending, `-` for descending (explain output).
    pub fn sign(self) -> char {
        match self {
            Direction::Ascending => '+',
            Direction::Descending => '-',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// Compares a stored column name against a name written in a query.
/// Unquoted identifiers match case-insensitively; quoted ones exactly.
pub fn names_match(stored: &str, written: &str, quoted: bool) -> bool {
    if quoted {
        stored == written
    } else {
        stored.eq_ignore_ascii_case(written)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub id: ColumnId,
    pub name: String,
    pub column_type: ColumnType,
}

/// One key column of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexColumn {
    pub column: ColumnId,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub id: IndexId,
    pub name: String,
    pub unique: bool,
    /// Declared key columns, in definition order
    pub columns: Vec<IndexColumn>,
    /// Primary key columns appended to make entries unique (empty for primary)
    pub implicit_columns: Vec<IndexColumn>,
    /// Non-key columns carried in the index entry value
    pub stored_columns: Vec<ColumnId>,
}

impl IndexDescriptor {
    pub fn is_primary(&self) -> bool {
        self.id == PRIMARY_INDEX_ID
    }

    /// Declared key columns followed by the implicit primary key suffix.
    pub fn full_key(&self) -> impl Iterator<Item = &IndexColumn> {
        self.columns.iter().chain(self.implicit_columns.iter())
    }

    /// Returns true if an entry of this index carries `column` without a
    /// fetch from the primary index.
    pub fn contains_column(&self, column: ColumnId) -> bool {
        self.is_primary()
            || self.full_key().any(|c| c.column == column)
            || self.stored_columns.contains(&column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub id: TableId,
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub primary_index: IndexDescriptor,
    pub indexes: Vec<IndexDescriptor>,
    pub privileges: PrivilegeDescriptor,
}

impl TableDescriptor {
    /// Builds and validates a descriptor from a definition.
    pub fn from_def(id: TableId, def: &TableDef) -> CatalogResult<Self> {
        if def.columns.is_empty() {
            return Err(CatalogError::NoColumns(def.name.clone()));
        }

        let mut columns: Vec<ColumnDescriptor> = Vec::with_capacity(def.columns.len());
        for (pos, col) in def.columns.iter().enumerate() {
            if columns.iter().any(|c| names_match(&c.name, &col.name, false)) {
                return Err(CatalogError::DuplicateColumn {
                    table: def.name.clone(),
                    column: col.name.clone(),
                });
            }
            columns.push(ColumnDescriptor {
                id: pos as ColumnId + 1,
                name: col.name.clone(),
                column_type: col.column_type,
            });
        }

        let mut table = Self {
            id,
            name: def.name.clone(),
            columns,
            primary_index: IndexDescriptor {
                id: PRIMARY_INDEX_ID,
                name: PRIMARY_INDEX_NAME.to_string(),
                unique: true,
                columns: Vec::new(),
                implicit_columns: Vec::new(),
                stored_columns: Vec::new(),
            },
            indexes: Vec::new(),
            privileges: PrivilegeDescriptor::default_object(),
        };

        if def.primary_key.is_empty() {
            return Err(CatalogError::MissingPrimaryKey(def.name.clone()));
        }
        table.primary_index.columns = table.resolve_key(PRIMARY_INDEX_NAME, &def.primary_key)?;

        for (pos, index_def) in def.indexes.iter().enumerate() {
            let index = table.build_secondary(pos as IndexId + PRIMARY_INDEX_ID + 1, index_def)?;
            table.indexes.push(index);
        }

        Ok(table)
    }

    fn build_secondary(&self, id: IndexId, def: &IndexDef) -> CatalogResult<IndexDescriptor> {
        if names_match(&def.name, PRIMARY_INDEX_NAME, false)
            || self.indexes.iter().any(|i| names_match(&i.name, &def.name, false))
        {
            return Err(CatalogError::DuplicateIndex {
                table: self.name.clone(),
                index: def.name.clone(),
            });
        }
        if def.columns.is_empty() {
            return Err(CatalogError::InvalidIndex {
                index: def.name.clone(),
                reason: "no key columns".into(),
            });
        }

        let columns = self.resolve_key(&def.name, &def.columns)?;
        let implicit_columns: Vec<IndexColumn> = self
            .primary_index
            .columns
            .iter()
            .filter(|pk| !columns.iter().any(|c| c.column == pk.column))
            .copied()
            .collect();

        let mut stored_columns = Vec::with_capacity(def.storing.len());
        for name in &def.storing {
            let column = self.require_column(name)?.id;
            if columns.iter().chain(implicit_columns.iter()).any(|c| c.column == column) {
                return Err(CatalogError::InvalidIndex {
                    index: def.name.clone(),
                    reason: format!("stored column \"{}\" is already part of the key", name),
                });
            }
            stored_columns.push(column);
        }

        Ok(IndexDescriptor {
            id,
            name: def.name.clone(),
            unique: def.unique,
            columns,
            implicit_columns,
            stored_columns,
        })
    }

    fn resolve_key(&self, index: &str, defs: &[IndexColumnDef]) -> CatalogResult<Vec<IndexColumn>> {
        let mut key: Vec<IndexColumn> = Vec::with_capacity(defs.len());
        for def in defs {
            let column = self.require_column(def.column())?.id;
            if key.iter().any(|c| c.column == column) {
                return Err(CatalogError::InvalidIndex {
                    index: index.to_string(),
                    reason: format!("column \"{}\" appears more than once", def.column()),
                });
            }
            key.push(IndexColumn {
                column,
                direction: def.direction(),
            });
        }
        Ok(key)
    }

    fn require_column(&self, name: &str) -> CatalogResult<&ColumnDescriptor> {
        self.find_column(name, false)
            .ok_or_else(|| CatalogError::ColumnNotFound {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    pub fn column(&self, id: ColumnId) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Position of a column in the table's column list (row layout order).
    pub fn column_position(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Ids of the primary key columns, in key order.
    pub fn primary_key_columns(&self) -> Vec<ColumnId> {
        self.primary_index.columns.iter().map(|c| c.column).collect()
    }

    pub fn column_name(&self, id: ColumnId) -> &str {
        self.column(id).map(|c| c.name.as_str()).unwrap_or("?")
    }

    pub fn find_column(&self, name: &str, quoted: bool) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| names_match(&c.name, name, quoted))
    }

    /// Primary index first, then secondary indexes in definition order.
    pub fn all_indexes(&self) -> impl Iterator<Item = &IndexDescriptor> {
        std::iter::once(&self.primary_index).chain(self.indexes.iter())
    }

    pub fn index(&self, id: IndexId) -> Option<&IndexDescriptor> {
        self.all_indexes().find(|i| i.id == id)
    }

    pub fn find_index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.all_indexes().find(|i| names_match(&i.name, name, false))
    }

    /// Returns a copy carrying different privileges. The descriptor itself is
    /// never edited in place.
    pub fn with_privileges(&self, privileges: PrivilegeDescriptor) -> CatalogResult<Self> {
        privileges
            .validate(false)
            .map_err(|source| CatalogError::InvalidPrivileges {
                table: self.name.clone(),
                source,
            })?;
        Ok(Self {
            privileges,
            ..self.clone()
        })
    }
}

// ============================================================================
// Definitions (input format)
// ============================================================================

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Index key column, either a bare name (ascending) or a name with direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexColumnDef {
    Name(String),
    Directed {
        column: String,
        #[serde(default)]
        direction: Direction,
    },
}

impl IndexColumnDef {
    pub fn column(&self) -> &str {
        match self {
            IndexColumnDef::Name(name) => name,
            IndexColumnDef::Directed { column, .. } => column,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            IndexColumnDef::Name(_) => Direction::Ascending,
            IndexColumnDef::Directed { direction, .. } => *direction,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        IndexColumnDef::Directed {
            column: column.into(),
            direction: Direction::Descending,
        }
    }
}

impl From<&str> for IndexColumnDef {
    fn from(name: &str) -> Self {
        IndexColumnDef::Name(name.to_string())
    }
}

/// Secondary index definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<IndexColumnDef>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub storing: Vec<String>,
}

impl IndexDef {
    pub fn new<C: Into<IndexColumnDef>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = C>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            storing: Vec::new(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn storing(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.storing = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Table definition, as accepted by `CREATE TABLE` or a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub primary_key: Vec<IndexColumnDef>,
    #[serde(default)]
    pub indexes: Vec<IndexDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            column_type,
        });
        self
    }

    pub fn primary_key<C: Into<IndexColumnDef>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }
}
