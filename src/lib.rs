//! kvsql - ORDER BY ordering satisfaction and index selection over an
//! ordered key-value store

pub mod catalog;
pub mod cli;
pub mod engine;
pub mod executor;
pub mod kv;
pub mod observability;
pub mod planner;
pub mod privilege;
