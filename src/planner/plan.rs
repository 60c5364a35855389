//! Physical plan tree
//!
//! Plans borrow table and index descriptors from the catalog snapshot they
//! were built against. The tree is immutable once assembled.

use serde::Serialize;

use crate::catalog::{ColumnId, IndexColumn, IndexDescriptor, TableDescriptor};

use super::expr::ScalarExpr;
use super::ordering::OrderingRequirement;
use super::resolver::OutputColumn;

/// Index scan. The row layout is `columns`, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanNode<'a> {
    pub table: &'a TableDescriptor,
    pub index: &'a IndexDescriptor,
    pub columns: Vec<ColumnId>,
    pub filter: Option<ScalarExpr>,
    /// Each index entry is completed from the primary index
    pub needs_lookup: bool,
    /// Order rows come out in: the full key, flipped for reverse scans
    pub ordering: Vec<IndexColumn>,
}

impl<'a> ScanNode<'a> {
    pub fn new(
        table: &'a TableDescriptor,
        index: &'a IndexDescriptor,
        reverse: bool,
        columns: Vec<ColumnId>,
        filter: Option<ScalarExpr>,
        needs_lookup: bool,
    ) -> Self {
        let ordering = index
            .full_key()
            .map(|c| IndexColumn {
                column: c.column,
                direction: if reverse { c.direction.reverse() } else { c.direction },
            })
            .collect();
        Self {
            table,
            index,
            columns,
            filter,
            needs_lookup,
            ordering,
        }
    }
}

/// Sorts its input by `ordering`, or only strips hidden columns when the
/// input already arrives in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortNode<'a> {
    pub ordering: OrderingRequirement,
    pub needs_sort: bool,
    /// Input row layout
    pub columns: Vec<ColumnId>,
    /// Leading columns kept in the output
    pub keep: usize,
    pub input: Box<PlanNode<'a>>,
}

/// Evaluates the select list over its input.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode<'a> {
    pub outputs: Vec<OutputColumn>,
    /// Input row layout
    pub columns: Vec<ColumnId>,
    pub input: Box<PlanNode<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode<'a> {
    Scan(ScanNode<'a>),
    ReverseScan(ScanNode<'a>),
    Sort(SortNode<'a>),
    Render(RenderNode<'a>),
}

impl<'a> PlanNode<'a> {
    /// Node name as shown by explain.
    pub fn kind(&self) -> &'static str {
        match self {
            PlanNode::Scan(_) => "scan",
            PlanNode::ReverseScan(_) => "revscan",
            PlanNode::Sort(sort) if sort.needs_sort => "sort",
            PlanNode::Sort(_) => "nosort",
            PlanNode::Render(_) => "render",
        }
    }

    /// Node detail as shown by explain.
    pub fn detail(&self) -> String {
        match self {
            PlanNode::Scan(scan) | PlanNode::ReverseScan(scan) => {
                format!("{}@{}", scan.table.name, scan.index.name)
            }
            PlanNode::Sort(sort) => sort.ordering.to_string(),
            PlanNode::Render(render) => render
                .outputs
                .iter()
                .map(|o| o.name.as_str())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn input(&self) -> Option<&PlanNode<'a>> {
        match self {
            PlanNode::Scan(_) | PlanNode::ReverseScan(_) => None,
            PlanNode::Sort(sort) => Some(&sort.input),
            PlanNode::Render(render) => Some(&render.input),
        }
    }

    /// The scan at the bottom of the tree.
    pub fn scan(&self) -> &ScanNode<'a> {
        match self {
            PlanNode::Scan(scan) | PlanNode::ReverseScan(scan) => scan,
            PlanNode::Sort(sort) => sort.input.scan(),
            PlanNode::Render(render) => render.input.scan(),
        }
    }

    pub fn is_reverse_scan(&self) -> bool {
        matches!(self.bottom(), PlanNode::ReverseScan(_))
    }

    fn bottom(&self) -> &PlanNode<'a> {
        let mut node = self;
        while let Some(input) = node.input() {
            node = input;
        }
        node
    }

    /// Pre-order walk with depths, root at 0.
    pub fn walk(&self) -> Vec<(usize, &PlanNode<'a>)> {
        let mut out = Vec::new();
        let mut node = Some(self);
        let mut depth = 0;
        while let Some(current) = node {
            out.push((depth, current));
            node = current.input();
            depth += 1;
        }
        out
    }
}

/// Whether the plan sorts, only strips hidden columns, or does neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDecision {
    Required,
    Elided,
    None,
}

impl SortDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDecision::Required => "required",
            SortDecision::Elided => "elided",
            SortDecision::None => "none",
        }
    }
}

/// Flat description of a plan for logs and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub table: String,
    pub index: String,
    pub reverse: bool,
    pub index_lookup: bool,
    pub sort: SortDecision,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan<'a> {
    pub root: PlanNode<'a>,
    /// Visible output column names
    pub columns: Vec<String>,
    /// True if the statement carried an ORDER BY clause
    pub ordered: bool,
}

impl<'a> Plan<'a> {
    pub fn table(&self) -> &'a TableDescriptor {
        self.root.scan().table
    }

    pub fn summary(&self) -> PlanSummary {
        let scan = self.root.scan();
        let sort = self
            .root
            .walk()
            .into_iter()
            .find_map(|(_, node)| match node {
                PlanNode::Sort(sort) if sort.needs_sort => Some(SortDecision::Required),
                _ => None,
            })
            .unwrap_or(if self.ordered {
                SortDecision::Elided
            } else {
                SortDecision::None
            });

        PlanSummary {
            table: scan.table.name.clone(),
            index: scan.index.name.clone(),
            reverse: self.root.is_reverse_scan(),
            index_lookup: scan.needs_lookup,
            sort,
        }
    }
}
