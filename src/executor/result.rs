//! Result types for query execution

use serde::Serialize;

use crate::kv::Datum;

/// Result of query execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Visible column names
    pub columns: Vec<String>,
    /// Rows in result order
    pub rows: Vec<Vec<Datum>>,
    /// Number of KVs read from the store
    pub kvs_scanned: usize,
}

impl ExecutionResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of one output column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<Datum>> {
        let pos = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(pos).cloned().unwrap_or(Datum::Null))
                .collect(),
        )
    }
}
