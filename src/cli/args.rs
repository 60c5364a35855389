//! CLI argument definitions using clap
//!
//! Commands:
//! - kvsql explain --config <path> [--debug] [--user <name>]
//! - kvsql query --config <path> [--user <name>]
//! - kvsql check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kvsql - ORDER BY planning over an ordered key-value store
#[derive(Parser, Debug)]
#[command(name = "kvsql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan a statement read from stdin and print the plan
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./kvsql.json")]
        config: PathBuf,

        /// Print every KV the statement reads instead of the plan
        #[arg(long)]
        debug: bool,

        /// Run as this user instead of the configured one
        #[arg(long)]
        user: Option<String>,
    },

    /// Execute a statement read from stdin and print its rows
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./kvsql.json")]
        config: PathBuf,

        /// Run as this user instead of the configured one
        #[arg(long)]
        user: Option<String>,
    },

    /// Validate the configuration and catalog, then list tables
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./kvsql.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_explain_debug() {
        let cli = Cli::try_parse_from(["kvsql", "explain", "--config", "c.json", "--debug"]).unwrap();
        match cli.command {
            Command::Explain { config, debug, user } => {
                assert_eq!(config, PathBuf::from("c.json"));
                assert!(debug);
                assert_eq!(user, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_query_user() {
        let cli = Cli::try_parse_from(["kvsql", "query", "--user", "bob"]).unwrap();
        match cli.command {
            Command::Query { config, user } => {
                assert_eq!(config, PathBuf::from("./kvsql.json"));
                assert_eq!(user.as_deref(), Some("bob"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
