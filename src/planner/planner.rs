//! Plan assembly
//!
//! Produces deterministic plans: the same statement against the same
//! catalog snapshot always yields the same tree.
//!
//! Index selection (strict order among indexes whose order satisfies the
//! requirement):
//! 1. Covering indexes
//! 2. Longest matched requirement prefix
//! 3. The primary index
//! 4. Definition order
//!
//! With no satisfying index the plan scans the primary index under a sort.

use crate::catalog::{Catalog, ColumnId, IndexColumn};

use super::ast::SelectStatement;
use super::candidates::{CandidateEvaluator, MatchKind};
use super::errors::{PlannerError, PlannerResult};
use super::ordering::{EqualityPin, OrderingRequirement};
use super::plan::{Plan, PlanNode, RenderNode, ScanNode, SortNode};
use super::resolver::{Projection, Resolver};

/// Query planner over a read-only catalog.
pub struct QueryPlanner<'a, C: Catalog> {
    catalog: &'a C,
}

impl<'a, C: Catalog> QueryPlanner<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Plans a statement, returning an immutable plan or the first error.
    pub fn plan(&self, stmt: &SelectStatement) -> PlannerResult<Plan<'a>> {
        // 1. Resolve the data source
        let source = stmt.from.as_ref().ok_or(PlannerError::MissingFrom)?;
        let table = self.catalog.get_table(&source.name)?;

        // 2. Bind select list, filter and ORDER BY targets
        let resolver = Resolver::new(table, source);
        let projection = resolver.resolve_select_list(&stmt.targets)?;
        let filter = resolver.resolve_filter(stmt.filter.as_ref())?;
        let targets = stmt
            .order_by
            .iter()
            .map(|term| {
                let target = resolver.resolve_order_target(&term.expr, &projection)?;
                Ok((target, term.direction.unwrap_or_default()))
            })
            .collect::<PlannerResult<Vec<_>>>()?;
        let requirement = OrderingRequirement::build(targets);

        // 3. Lay out the scan row: visible outputs, then hidden sort columns
        let render = !projection.is_plain();
        let layout = scan_layout(&projection, &requirement, render);
        let keep = if render { layout.len() } else { projection.len() };

        let mut needed = layout.clone();
        if let Some(filter) = &filter {
            filter.collect_columns(&mut needed);
        }

        // 4. Choose the index
        let pins = EqualityPin::from_filter(filter.as_ref());
        let evaluator = CandidateEvaluator::new(table, &pins, &needed);
        let chosen = evaluator.choose(&requirement);
        let reverse = chosen.kind == MatchKind::Reverse;

        let scan = ScanNode::new(
            table,
            chosen.index,
            reverse,
            layout.clone(),
            filter,
            chosen.needs_lookup(),
        );
        if chosen.kind.is_match() && !provides(&scan.ordering, &table.primary_key_columns(), &requirement, &pins) {
            return Err(PlannerError::Internal(format!(
                "index {} chosen for an ordering it does not provide",
                chosen.index.name
            )));
        }

        // 5. Assemble: scan, optional sort, optional render
        let mut root = if reverse {
            PlanNode::ReverseScan(scan)
        } else {
            PlanNode::Scan(scan)
        };

        let needs_sort = !chosen.kind.is_match();
        let has_hidden = layout.len() > keep;
        if needs_sort || has_hidden {
            root = PlanNode::Sort(SortNode {
                ordering: requirement,
                needs_sort,
                columns: layout.clone(),
                keep,
                input: Box::new(root),
            });
        }

        if render {
            root = PlanNode::Render(RenderNode {
                outputs: projection.columns().to_vec(),
                columns: layout,
                input: Box::new(root),
            });
        }

        Ok(Plan {
            root,
            columns: projection.names(),
            ordered: !stmt.order_by.is_empty(),
        })
    }
}

/// Scan row layout.
///
/// Plain projections put the output columns first, in output order, so a
/// sort only has to truncate. Computed projections carry each referenced
/// column once and leave the shaping to the render node. Columns that only
/// ordering needs are appended in requirement order.
fn scan_layout(projection: &Projection, requirement: &OrderingRequirement, render: bool) -> Vec<ColumnId> {
    let mut layout: Vec<ColumnId> = Vec::new();
    if render {
        for output in projection.columns() {
            output.expr.collect_columns(&mut layout);
        }
    } else {
        layout.extend(projection.columns().iter().filter_map(|c| c.expr.as_column()));
    }

    for column in requirement.columns() {
        let mut referenced = Vec::new();
        column.reference.to_expr().collect_columns(&mut referenced);
        for id in referenced {
            if !layout.contains(&id) {
                layout.push(id);
            }
        }
    }
    layout
}

/// Re-checks a chosen scan order against the requirement, walking from the
/// scan side. Entries after the point where the primary key is fixed are not
/// checked.
fn provides(
    scan_order: &[IndexColumn],
    primary_key: &[ColumnId],
    requirement: &OrderingRequirement,
    pins: &EqualityPin,
) -> bool {
    let mut provided = scan_order.iter().filter(|c| !pins.contains(c.column));
    let mut fixed: Vec<ColumnId> = Vec::new();
    for want in requirement.columns().iter().filter(|c| !pins.pins(c)) {
        if primary_key
            .iter()
            .all(|pk| pins.contains(*pk) || fixed.contains(pk))
        {
            return true;
        }
        match provided.next() {
            Some(have) if want.column() == Some(have.column) && want.direction == have.direction => {
                fixed.push(have.column)
            }
            _ => return false,
        }
    }
    true
}
