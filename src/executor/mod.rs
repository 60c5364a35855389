//! Query executor subsystem for kvsql
//!
//! Consumes plan trees and produces deterministic results.
//!
//! # Execution Flow
//!
//! 1. Walk the chosen index range, forwards or backwards
//! 2. Rebuild rows from KVs, with a primary lookup for non-covering indexes
//! 3. Filter rows; a filter keeps a row only on TRUE
//! 4. Sort when the plan requires it, then drop hidden columns
//! 5. Render computed outputs
//!
//! # Invariants
//!
//! - Same plan and same data produce the same rows in the same order
//! - A sort is stable, so ties keep index order
//! - An index entry without its primary row is reported as corruption

mod errors;
mod eval;
mod executor;
mod result;
mod sorter;
mod trace;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use eval::{RowLayout, ScalarEvaluator};
pub use executor::QueryExecutor;
pub use result::ExecutionResult;
pub use sorter::ResultSorter;
pub use trace::TraceEntry;
