//! KV keys and values
//!
//! A key is `(table, index, key parts, column)`. Primary rows are spread over
//! one sentinel entry (`column = None`) and one entry per non-NULL non-key
//! column. Secondary entries are a single KV with the stored columns packed
//! into the value.

use std::fmt;

use crate::catalog::{ColumnId, IndexId, TableDescriptor, TableId};

use super::datum::{Datum, KeyPart};

/// Ordered KV key. Derived ordering sorts by table, index, parts, then column,
/// which places a row's sentinel directly before its column entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    pub table: TableId,
    pub index: IndexId,
    pub parts: Vec<KeyPart>,
    pub column: Option<ColumnId>,
}

impl Key {
    /// Smallest key of an index.
    pub fn index_start(table: TableId, index: IndexId) -> Self {
        Self {
            table,
            index,
            parts: Vec::new(),
            column: None,
        }
    }

    /// Exclusive upper bound of an index.
    pub fn index_end(table: TableId, index: IndexId) -> Self {
        Self::index_start(table, index + 1)
    }

    pub fn row(table: TableId, index: IndexId, parts: Vec<KeyPart>) -> Self {
        Self {
            table,
            index,
            parts,
            column: None,
        }
    }

    pub fn with_column(&self, column: ColumnId) -> Self {
        Self {
            column: Some(column),
            ..self.clone()
        }
    }

    /// Returns true if both keys belong to the same logical row.
    pub fn same_row(&self, other: &Key) -> bool {
        self.table == other.table && self.index == other.index && self.parts == other.parts
    }

    /// Human-readable form, e.g. `/t/primary/1/b`.
    pub fn pretty(&self, table: &TableDescriptor) -> String {
        let index = table
            .index(self.index)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| self.index.to_string());

        let mut out = format!("/{}/{}", table.name, index);
        for part in &self.parts {
            out.push('/');
            out.push_str(&pretty_datum(part.datum()));
        }
        if let Some(column) = self.column {
            out.push('/');
            out.push_str(table.column_name(column));
        }
        out
    }
}

fn pretty_datum(datum: &Datum) -> String {
    match datum {
        Datum::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Value half of a KV pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvValue {
    /// Row existence marker on the primary index
    Sentinel,
    /// One non-key column of a primary row
    Column(Datum),
    /// Stored (covered) columns of a secondary entry, in index order
    Stored(Vec<Datum>),
}

impl fmt::Display for KvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvValue::Sentinel => write!(f, "NULL"),
            KvValue::Column(datum) => write!(f, "{}", datum),
            KvValue::Stored(values) if values.is_empty() => write!(f, "NULL"),
            KvValue::Stored(values) => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", rendered.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnType, Direction, TableDef, PRIMARY_INDEX_ID};

    fn table() -> TableDescriptor {
        let def = TableDef::new("t")
            .column("a", ColumnType::Int)
            .column("b", ColumnType::String)
            .primary_key(["a"]);
        TableDescriptor::from_def(1, &def).unwrap()
    }

    fn part(v: i64) -> Vec<KeyPart> {
        vec![KeyPart::new(Datum::Int(v), Direction::Ascending)]
    }

    #[test]
    fn test_sentinel_sorts_before_columns() {
        let sentinel = Key::row(1, PRIMARY_INDEX_ID, part(1));
        let column = sentinel.with_column(2);
        let next_row = Key::row(1, PRIMARY_INDEX_ID, part(2));

        assert!(sentinel < column);
        assert!(column < next_row);
        assert!(sentinel.same_row(&column));
        assert!(!column.same_row(&next_row));
    }

    #[test]
    fn test_index_bounds() {
        let key = Key::row(1, PRIMARY_INDEX_ID, part(i64::MAX)).with_column(9);
        assert!(Key::index_start(1, PRIMARY_INDEX_ID) < key);
        assert!(key < Key::index_end(1, PRIMARY_INDEX_ID));
    }

    #[test]
    fn test_pretty() {
        let table = table();
        let key = Key::row(1, PRIMARY_INDEX_ID, part(1));
        assert_eq!(key.pretty(&table), "/t/primary/1");
        assert_eq!(key.with_column(2).pretty(&table), "/t/primary/1/b");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(KvValue::Sentinel.to_string(), "NULL");
        assert_eq!(KvValue::Column(Datum::Int(3)).to_string(), "3");
        assert_eq!(KvValue::Stored(vec![]).to_string(), "NULL");
        assert_eq!(
            KvValue::Stored(vec![Datum::Int(1), Datum::from("x")]).to_string(),
            "(1,'x')"
        );
    }
}
