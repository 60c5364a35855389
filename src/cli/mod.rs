//! CLI module for kvsql
//!
//! Provides command-line interface for:
//! - explain: plan a statement (or trace its KV reads)
//! - query: execute a statement
//! - check: validate config and catalog

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, explain, query, run, run_command, CatalogFile, Config, GrantEntry, TableEntry};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_statement, read_statement, write_error, write_response};
