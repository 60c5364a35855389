//! Query planner subsystem for kvsql
//!
//! Turns a resolved single-table SELECT into a physical plan that returns rows
//! in ORDER BY order, using index order instead of sorting wherever an index
//! already provides it.
//!
//! # Design Principles
//!
//! - Deterministic: same statement and catalog snapshot, same plan
//! - Pure: planning never touches the KV store and never logs
//! - Explicit: every failure is reported before any plan node is built
//!
//! # Pipeline
//!
//! 1. Resolve names and ordinals ([`Resolver`])
//! 2. Build the deduplicated ordering requirement ([`OrderingRequirement`])
//! 3. Match each index against it ([`CandidateEvaluator`])
//! 4. Assemble scan, sort and render nodes ([`QueryPlanner`])
//! 5. Render explain lines ([`ExplainPlan`])

mod ast;
mod candidates;
mod errors;
mod explain;
mod expr;
mod ordering;
mod plan;
mod planner;
mod resolver;

pub use ast::{BinaryOp, Expr, OrderBy, SelectStatement, SelectTarget, TableRef, UnaryOp};
pub use candidates::{match_ordering, CandidateEvaluator, IndexCandidate, MatchKind};
pub use errors::{PlannerError, PlannerResult};
pub use explain::{ExplainLine, ExplainPlan};
pub use expr::ScalarExpr;
pub use ordering::{EqualityPin, OrderingColumn, OrderingRequirement};
pub use plan::{Plan, PlanNode, PlanSummary, RenderNode, ScanNode, SortDecision, SortNode};
pub use planner::QueryPlanner;
pub use resolver::{ColumnReference, OutputColumn, Projection, ResolvedTarget, Resolver};
