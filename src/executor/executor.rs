//! Query executor for kvsql
//!
//! Executes plan trees against the KV store, producing deterministic results.
//!
//! Execution flow per node:
//! 1. Scan: walk the index range (backwards for reverse scans), rebuild each
//!    row, complete it from the primary index when the scan needs a lookup,
//!    apply the filter, and project the scan layout
//! 2. Sort: evaluate sort keys, stable-sort when required, drop hidden columns
//! 3. Render: evaluate the select list

use crate::kv::{
    decode_index_entry, decode_primary, primary_key_parts, Datum, Key, KvStore, KvValue,
};
use crate::planner::{Plan, PlanNode, ScanNode};

use super::errors::{ExecutorError, ExecutorResult};
use super::eval::{RowLayout, ScalarEvaluator};
use super::result::ExecutionResult;
use super::sorter::ResultSorter;
use super::trace::TraceEntry;

type Row = Vec<Datum>;

/// Query executor over a KV store
pub struct QueryExecutor<'s> {
    store: &'s KvStore,
    trace: Option<Vec<TraceEntry>>,
    kvs_scanned: usize,
}

impl<'s> QueryExecutor<'s> {
    pub fn new(store: &'s KvStore) -> Self {
        Self {
            store,
            trace: None,
            kvs_scanned: 0,
        }
    }

    /// Creates an executor that records every KV it reads.
    pub fn with_trace(store: &'s KvStore) -> Self {
        Self {
            trace: Some(Vec::new()),
            ..Self::new(store)
        }
    }

    /// Executes a plan and returns its rows.
    ///
    /// This method is deterministic: same plan + same data = same results.
    pub fn execute(&mut self, plan: &Plan<'_>) -> ExecutorResult<ExecutionResult> {
        let rows = self.run(&plan.root)?;
        Ok(ExecutionResult {
            columns: plan.columns.clone(),
            rows,
            kvs_scanned: self.kvs_scanned,
        })
    }

    /// Recorded trace entries; empty unless built with [`Self::with_trace`].
    pub fn into_trace(self) -> Vec<TraceEntry> {
        self.trace.unwrap_or_default()
    }

    fn run(&mut self, node: &PlanNode<'_>) -> ExecutorResult<Vec<Row>> {
        match node {
            PlanNode::Scan(scan) => self.scan(scan, false),
            PlanNode::ReverseScan(scan) => self.scan(scan, true),
            PlanNode::Sort(sort) => {
                let mut rows = self.run(&sort.input)?;
                if sort.needs_sort {
                    ResultSorter::sort(&mut rows, &sort.ordering, &sort.columns)?;
                }
                for row in rows.iter_mut() {
                    row.truncate(sort.keep);
                }
                Ok(rows)
            }
            PlanNode::Render(render) => {
                let rows = self.run(&render.input)?;
                rows.iter()
                    .map(|row| {
                        let evaluator = ScalarEvaluator::new(RowLayout::Columns(&render.columns), row);
                        render
                            .outputs
                            .iter()
                            .map(|output| evaluator.eval(&output.expr))
                            .collect::<ExecutorResult<Row>>()
                    })
                    .collect()
            }
        }
    }

    fn scan(&mut self, scan: &ScanNode<'_>, reverse: bool) -> ExecutorResult<Vec<Row>> {
        let store = self.store;
        let entries: Vec<(&Key, &KvValue)> = if reverse {
            store.scan_index(scan.table.id, scan.index.id).rev().collect()
        } else {
            store.scan_index(scan.table.id, scan.index.id).collect()
        };

        let mut out = Vec::new();
        if scan.index.is_primary() {
            let mut start = 0;
            while start < entries.len() {
                let mut end = start + 1;
                while end < entries.len() && entries[end].0.same_row(entries[start].0) {
                    end += 1;
                }
                let group = &entries[start..end];
                let row = decode_primary(scan.table, group);
                self.emit(scan, row, group, &mut out)?;
                start = end;
            }
            return Ok(out);
        }

        for &(key, value) in &entries {
            let mut touched = vec![(key, value)];
            let mut row = decode_index_entry(scan.table, scan.index, key, value);
            if scan.needs_lookup {
                let primary = &scan.table.primary_index;
                let parts = primary_key_parts(scan.table, &row);
                let lookup = store.row_entries(scan.table.id, primary.id, &parts);
                if lookup.is_empty() {
                    return Err(ExecutorError::data_corruption(
                        key.pretty(scan.table),
                        "index entry has no primary row",
                    ));
                }
                row = decode_primary(scan.table, &lookup);
                touched.extend(lookup);
            }
            self.emit(scan, row, &touched, &mut out)?;
        }
        Ok(out)
    }

    /// Filters one decoded table row, records its KVs and projects it.
    fn emit(
        &mut self,
        scan: &ScanNode<'_>,
        row: Row,
        touched: &[(&Key, &KvValue)],
        out: &mut Vec<Row>,
    ) -> ExecutorResult<()> {
        self.kvs_scanned += touched.len();

        let passes = match &scan.filter {
            Some(filter) => ScalarEvaluator::new(RowLayout::Table(scan.table), &row).matches(filter)?,
            None => true,
        };

        if let Some(trace) = self.trace.as_mut() {
            let row_index = out.len();
            for (i, (key, value)) in touched.iter().enumerate() {
                trace.push(TraceEntry {
                    row: row_index,
                    key: key.pretty(scan.table),
                    value: value.to_string(),
                    output: passes.then_some(i + 1 == touched.len()),
                });
            }
        }

        if passes {
            let projected = scan
                .columns
                .iter()
                .map(|column| {
                    scan.table
                        .column_position(*column)
                        .and_then(|pos| row.get(pos))
                        .cloned()
                        .unwrap_or(Datum::Null)
                })
                .collect();
            out.push(projected);
        }
        Ok(())
    }
}
