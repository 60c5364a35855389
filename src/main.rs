//! kvsql CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`, which also writes
//! the JSON error response. Exits with non-zero on failure.

use kvsql::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
