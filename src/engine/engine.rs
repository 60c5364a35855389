//! Query engine for kvsql
//!
//! Owns the catalog and the store, and runs statements through privilege
//! check, planner and executor. All logging and metrics for a statement
//! happen here; the planner and executor stay free of side effects.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogSnapshot, MemoryCatalog, TableDef};
use crate::executor::{ExecutionResult, QueryExecutor, TraceEntry};
use crate::kv::{Datum, KvStore, RowWriter};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, MetricsSnapshot};
use crate::planner::{ExplainPlan, Plan, PlanSummary, QueryPlanner, SelectStatement, SortDecision};
use crate::privilege::{Privilege, PrivilegeList, UserPrivilegeString};

use super::errors::{EngineError, EngineResult};

/// Single-node query engine
#[derive(Debug)]
pub struct Engine {
    catalog: MemoryCatalog,
    store: KvStore,
    metrics: Arc<MetricsRegistry>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(MetricsRegistry::new()))
    }

    /// Creates an engine that reports into a shared registry.
    pub fn with_metrics(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            catalog: MemoryCatalog::new(),
            store: KvStore::new(),
            metrics,
        }
    }

    /// Current catalog version
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.catalog.snapshot()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn create_table(&mut self, def: &TableDef) -> EngineResult<()> {
        let table = self.catalog.create_table(def)?;

        let columns = table.columns.len().to_string();
        let indexes = table.indexes.len().to_string();
        log_event_with_fields(
            Event::TableCreated,
            &[
                ("table", &table.name),
                ("columns", &columns),
                ("indexes", &indexes),
            ],
        );
        Ok(())
    }

    /// Writes rows into `table`, returning how many were written.
    ///
    /// Rows are written one at a time; a failing row leaves the rows
    /// before it in place.
    pub fn insert(&mut self, table: &str, rows: &[Vec<Datum>]) -> EngineResult<usize> {
        let snapshot = self.catalog.snapshot();
        let descriptor = snapshot.get_table(table)?;
        let writer = RowWriter::new(descriptor);
        for row in rows {
            writer.insert(&mut self.store, row)?;
        }

        let count = rows.len().to_string();
        log_event_with_fields(
            Event::RowsInserted,
            &[("table", &descriptor.name), ("rows", &count)],
        );
        Ok(rows.len())
    }

    pub fn grant(&mut self, table: &str, user: &str, privileges: &PrivilegeList) -> EngineResult<()> {
        let snapshot = self.catalog.snapshot();
        let updated = snapshot.get_table(table)?.privileges.grant(user, privileges);
        self.catalog.set_privileges(table, updated)?;
        Ok(())
    }

    /// Removes privileges from `user`. Fails if the result would leave the
    /// table without root holding ALL.
    pub fn revoke(&mut self, table: &str, user: &str, privileges: &PrivilegeList) -> EngineResult<()> {
        let snapshot = self.catalog.snapshot();
        let updated = snapshot.get_table(table)?.privileges.revoke(user, privileges);
        self.catalog.set_privileges(table, updated)?;
        Ok(())
    }

    /// `(user, privileges)` pairs for `table`, sorted by user.
    pub fn show_grants(&self, table: &str) -> EngineResult<Vec<UserPrivilegeString>> {
        let snapshot = self.catalog.snapshot();
        Ok(snapshot.get_table(table)?.privileges.show())
    }

    /// Plans `stmt` and returns its explain lines.
    pub fn explain(&self, user: &str, stmt: &SelectStatement) -> EngineResult<ExplainPlan> {
        let snapshot = self.catalog.snapshot();
        let plan = self.plan_statement(&snapshot, user, stmt)?;
        Ok(ExplainPlan::from_plan(&plan))
    }

    /// Plans and runs `stmt`, returning every KV the scan touched.
    pub fn explain_debug(&self, user: &str, stmt: &SelectStatement) -> EngineResult<Vec<TraceEntry>> {
        let snapshot = self.catalog.snapshot();
        let plan = self.plan_statement(&snapshot, user, stmt)?;
        let mut executor = QueryExecutor::with_trace(&self.store);
        executor.execute(&plan)?;
        Ok(executor.into_trace())
    }

    /// Plans and runs `stmt`.
    pub fn query(&self, user: &str, stmt: &SelectStatement) -> EngineResult<ExecutionResult> {
        let snapshot = self.catalog.snapshot();
        let plan = self.plan_statement(&snapshot, user, stmt)?;
        let result = QueryExecutor::new(&self.store).execute(&plan)?;

        self.metrics.record_query(result.row_count() as u64);
        let rows = result.row_count().to_string();
        let kvs = result.kvs_scanned.to_string();
        log_event_with_fields(
            Event::QueryExecuted,
            &[
                ("table", &plan.table().name),
                ("rows", &rows),
                ("kvs_scanned", &kvs),
            ],
        );
        Ok(result)
    }

    /// Privilege check, then planning.
    ///
    /// Flow:
    /// 1. Check SELECT on the FROM table
    /// 2. Plan against the snapshot
    /// 3. Record the outcome
    fn plan_statement<'s>(
        &self,
        snapshot: &'s CatalogSnapshot,
        user: &str,
        stmt: &SelectStatement,
    ) -> EngineResult<Plan<'s>> {
        // 1. Unknown tables and a missing FROM are reported by the planner
        if let Some(table) = stmt
            .from
            .as_ref()
            .and_then(|from| snapshot.get_table(&from.name).ok())
        {
            if !table.privileges.check(user, Privilege::Select) {
                self.metrics.increment_privilege_denials();
                log_event_with_fields(
                    Event::PrivilegeDenied,
                    &[("user", user), ("table", &table.name), ("privilege", "SELECT")],
                );
                return Err(EngineError::PermissionDenied {
                    user: user.to_string(),
                    privilege: Privilege::Select,
                    table: table.name.clone(),
                });
            }
        }

        // 2. Plan
        let plan = match QueryPlanner::new(snapshot).plan(stmt) {
            Ok(plan) => plan,
            Err(e) => {
                self.metrics.increment_plans_rejected();
                let message = e.to_string();
                log_event_with_fields(
                    Event::PlanRejected,
                    &[("code", e.code()), ("message", &message)],
                );
                return Err(e.into());
            }
        };

        // 3. Record
        self.record_plan(&plan.summary());
        Ok(plan)
    }

    fn record_plan(&self, summary: &PlanSummary) {
        self.metrics.increment_plans_built();
        match summary.sort {
            SortDecision::Required => self.metrics.increment_sorts_required(),
            SortDecision::Elided => self.metrics.increment_sorts_elided(),
            SortDecision::None => {}
        }
        if summary.reverse {
            self.metrics.increment_reverse_scans();
        }
        if summary.index_lookup {
            self.metrics.increment_index_lookups();
        }

        let direction = if summary.reverse { "reverse" } else { "forward" };
        let lookup = summary.index_lookup.to_string();
        log_event_with_fields(
            Event::PlanBuilt,
            &[
                ("table", &summary.table),
                ("index", &summary.index),
                ("direction", direction),
                ("index_lookup", &lookup),
                ("sort", summary.sort.as_str()),
            ],
        );
    }
}
