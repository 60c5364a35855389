//! Row encoding and decoding
//!
//! A row is a `Vec<Datum>` in table column order. Writing a row produces the
//! primary KVs and one entry per secondary index; decoding turns scanned KVs
//! back into a table-width row with absent columns as NULL.

use crate::catalog::{ColumnId, ColumnType, IndexDescriptor, TableDescriptor};

use super::datum::{Datum, KeyPart};
use super::errors::{KvError, KvResult};
use super::key::{Key, KvValue};
use super::store::KvStore;

/// Encodes the full key of `index` for a table-width row.
pub fn index_key_parts(table: &TableDescriptor, index: &IndexDescriptor, row: &[Datum]) -> Vec<KeyPart> {
    index
        .full_key()
        .map(|col| {
            let datum = table
                .column_position(col.column)
                .and_then(|pos| row.get(pos))
                .cloned()
                .unwrap_or(Datum::Null);
            KeyPart::new(datum, col.direction)
        })
        .collect()
}

/// Rebuilds a table-width row from the KVs of one primary row.
pub fn decode_primary(table: &TableDescriptor, entries: &[(&Key, &KvValue)]) -> Vec<Datum> {
    let mut row = vec![Datum::Null; table.columns.len()];
    let Some((first, _)) = entries.first() else {
        return row;
    };

    for (col, part) in table.primary_index.columns.iter().zip(first.parts.iter()) {
        if let Some(pos) = table.column_position(col.column) {
            row[pos] = part.datum().clone();
        }
    }

    for (key, value) in entries {
        if let (Some(column), KvValue::Column(datum)) = (key.column, value) {
            if let Some(pos) = table.column_position(column) {
                row[pos] = datum.clone();
            }
        }
    }

    row
}

/// Rebuilds the columns a secondary entry carries. Columns neither in the key
/// nor stored are NULL.
pub fn decode_index_entry(
    table: &TableDescriptor,
    index: &IndexDescriptor,
    key: &Key,
    value: &KvValue,
) -> Vec<Datum> {
    let mut row = vec![Datum::Null; table.columns.len()];

    for (col, part) in index.full_key().zip(key.parts.iter()) {
        if let Some(pos) = table.column_position(col.column) {
            row[pos] = part.datum().clone();
        }
    }

    if let KvValue::Stored(values) = value {
        for (column, datum) in index.stored_columns.iter().zip(values.iter()) {
            if let Some(pos) = table.column_position(*column) {
                row[pos] = datum.clone();
            }
        }
    }

    row
}

/// Primary key parts of a decoded row, used for index-to-primary lookups.
pub fn primary_key_parts(table: &TableDescriptor, row: &[Datum]) -> Vec<KeyPart> {
    index_key_parts(table, &table.primary_index, row)
}

/// Validates rows and writes their KVs.
pub struct RowWriter<'a> {
    table: &'a TableDescriptor,
}

impl<'a> RowWriter<'a> {
    pub fn new(table: &'a TableDescriptor) -> Self {
        Self { table }
    }

    /// Writes one row and all of its index entries.
    pub fn insert(&self, store: &mut KvStore, row: &[Datum]) -> KvResult<()> {
        self.validate(row)?;
        let row = &self.normalize(row);

        let primary = &self.table.primary_index;
        let row_key = Key::row(self.table.id, primary.id, primary_key_parts(self.table, row));
        if store.contains(&row_key) {
            return Err(KvError::DuplicateKey {
                table: self.table.name.clone(),
                index: primary.name.clone(),
            });
        }
        for index in self.table.indexes.iter().filter(|i| i.unique) {
            self.check_unique(store, index, row)?;
        }

        for (column, datum) in self.table.columns.iter().zip(row.iter()) {
            let in_key = primary.columns.iter().any(|c| c.column == column.id);
            if in_key || datum.is_null() {
                continue;
            }
            store.put(row_key.with_column(column.id), KvValue::Column(datum.clone()));
        }
        store.put(row_key, KvValue::Sentinel);

        for index in &self.table.indexes {
            let key = Key::row(self.table.id, index.id, index_key_parts(self.table, index, row));
            let stored: Vec<Datum> = index
                .stored_columns
                .iter()
                .map(|column| self.value_of(row, *column))
                .collect();
            store.put(key, KvValue::Stored(stored));
        }

        Ok(())
    }

    fn validate(&self, row: &[Datum]) -> KvResult<()> {
        if row.len() != self.table.columns.len() {
            return Err(KvError::ArityMismatch {
                table: self.table.name.clone(),
                expected: self.table.columns.len(),
                got: row.len(),
            });
        }

        for (column, datum) in self.table.columns.iter().zip(row.iter()) {
            if !datum.fits(column.column_type) {
                return Err(KvError::TypeMismatch {
                    column: column.name.clone(),
                    value: datum.clone(),
                });
            }
        }

        for col in &self.table.primary_index.columns {
            if self.value_of(row, col.column).is_null() {
                return Err(KvError::NullPrimaryKey(
                    self.table.column_name(col.column).to_string(),
                ));
            }
        }

        Ok(())
    }

    // Integers written to float columns are stored as floats so that key
    // order matches numeric order.
    fn normalize(&self, row: &[Datum]) -> Vec<Datum> {
        self.table
            .columns
            .iter()
            .zip(row.iter())
            .map(|(column, datum)| match (column.column_type, datum) {
                (ColumnType::Float, Datum::Int(v)) => Datum::Float(*v as f64),
                _ => datum.clone(),
            })
            .collect()
    }

    // Unique indexes compare declared columns only; NULLs never conflict.
    fn check_unique(&self, store: &KvStore, index: &IndexDescriptor, row: &[Datum]) -> KvResult<()> {
        let declared = index.columns.len();
        let parts = index_key_parts(self.table, index, row);
        if parts[..declared].iter().any(|p| p.datum().is_null()) {
            return Ok(());
        }

        let conflict = store
            .scan_prefix(self.table.id, index.id, &parts[..declared])
            .next()
            .is_some();
        if conflict {
            return Err(KvError::DuplicateKey {
                table: self.table.name.clone(),
                index: index.name.clone(),
            });
        }
        Ok(())
    }

    fn value_of(&self, row: &[Datum], column: ColumnId) -> Datum {
        self.table
            .column_position(column)
            .and_then(|pos| row.get(pos))
            .cloned()
            .unwrap_or(Datum::Null)
    }
}
