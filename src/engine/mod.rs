//! Engine subsystem for kvsql
//!
//! Ties the catalog, the KV store, privileges, the planner and the executor
//! together behind one type.
//!
//! # Statement Flow
//!
//! 1. Take a catalog snapshot
//! 2. Check SELECT on the FROM table
//! 3. Plan against the snapshot
//! 4. Execute (or render the plan)
//! 5. Log and count the outcome
//!
//! Explicit construction replaces any process-wide registration: callers
//! build an [`Engine`] and pass it where it is needed.

mod engine;
mod errors;

pub use engine::Engine;
pub use errors::{EngineError, EngineResult};
