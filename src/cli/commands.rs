//! CLI command implementations
//!
//! Every command boots the same way: load and validate the config, apply
//! the catalog file to a fresh engine, then run. Failures are written as a
//! JSON error response on stdout and the process exits non-zero.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::TableDef;
use crate::engine::Engine;
use crate::kv::Datum;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::planner::SelectStatement;
use crate::privilege::{Privilege, PrivilegeList, ROOT_USER};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_statement, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog file (required). Relative paths resolve against the config
    /// file's directory.
    pub catalog_path: String,

    /// User statements run as (optional, default "root")
    #[serde(default = "default_user")]
    pub user: String,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Make `explain` print the KV trace (optional, default false)
    #[serde(default)]
    pub debug_explain: bool,
}

fn default_user() -> String {
    ROOT_USER.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.catalog_path.trim().is_empty() {
            return Err(CliError::config_error("catalog_path must not be empty"));
        }
        if self.user.is_empty() {
            return Err(CliError::config_error("user must not be empty"));
        }
        self.severity()?;
        Ok(())
    }

    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(|e: String| {
            CliError::config_error(format!("Invalid log_level: '{}' ({})", self.log_level, e))
        })
    }

    /// Catalog file location for a config loaded from `config_path`
    pub fn catalog_file(&self, config_path: &Path) -> PathBuf {
        match config_path.parent() {
            Some(dir) => dir.join(&self.catalog_path),
            None => PathBuf::from(&self.catalog_path),
        }
    }
}

/// Catalog file: table definitions with their rows, plus grants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub tables: Vec<TableEntry>,
    #[serde(default)]
    pub grants: Vec<GrantEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableEntry {
    #[serde(flatten)]
    pub def: TableDef,
    #[serde(default)]
    pub rows: Vec<Vec<Datum>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantEntry {
    pub table: String,
    pub user: String,
    pub privileges: Vec<Privilege>,
}

impl CatalogFile {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::catalog_error(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| CliError::catalog_error(format!("Invalid catalog JSON: {}", e)))
    }

    /// Creates every table, writes its rows and applies grants, in file order.
    pub fn apply(&self, engine: &mut Engine) -> CliResult<()> {
        let catalog_err = |e: crate::engine::EngineError| CliError::catalog_error(e.to_string());

        for entry in &self.tables {
            engine.create_table(&entry.def).map_err(catalog_err)?;
            engine.insert(&entry.def.name, &entry.rows).map_err(catalog_err)?;
        }
        for grant in &self.grants {
            engine
                .grant(
                    &grant.table,
                    &grant.user,
                    &PrivilegeList::new(grant.privileges.iter().copied()),
                )
                .map_err(catalog_err)?;
        }
        Ok(())
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(ref e) = result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Explain {
            config,
            debug,
            user,
        } => explain(&config, debug, user.as_deref()),
        Command::Query { config, user } => query(&config, user.as_deref()),
        Command::Check { config } => check(&config),
    }
}

/// Plan a statement from stdin and print the plan (or the KV trace)
pub fn explain(config_path: &Path, debug: bool, user: Option<&str>) -> CliResult<()> {
    let (config, engine) = boot(config_path)?;
    let stmt = read_statement()?;
    let user = user.unwrap_or(&config.user);
    let data = explain_statement(&engine, user, &stmt, debug || config.debug_explain)?;
    write_response(data)
}

/// Execute a statement from stdin and print the rows
pub fn query(config_path: &Path, user: Option<&str>) -> CliResult<()> {
    let (config, engine) = boot(config_path)?;
    let stmt = read_statement()?;
    let user = user.unwrap_or(&config.user);
    let data = query_statement(&engine, user, &stmt)?;
    write_response(data)
}

/// Validate config and catalog, then print tables and indexes
pub fn check(config_path: &Path) -> CliResult<()> {
    let (config, engine) = boot(config_path)?;
    write_response(check_report(&config, &engine))
}

fn explain_statement(
    engine: &Engine,
    user: &str,
    stmt: &SelectStatement,
    debug: bool,
) -> CliResult<Value> {
    if debug {
        let trace: Vec<String> = engine
            .explain_debug(user, stmt)?
            .iter()
            .map(|entry| entry.to_string())
            .collect();
        Ok(json!({ "trace": trace }))
    } else {
        let plan = engine.explain(user, stmt)?;
        Ok(json!({ "plan": plan.to_lines() }))
    }
}

fn query_statement(engine: &Engine, user: &str, stmt: &SelectStatement) -> CliResult<Value> {
    let result = engine.query(user, stmt)?;
    Ok(json!({
        "columns": result.columns,
        "rows": result.rows,
        "metrics": engine.metrics(),
    }))
}

fn check_report(config: &Config, engine: &Engine) -> Value {
    let snapshot = engine.snapshot();
    let tables: Vec<Value> = snapshot
        .tables()
        .map(|table| {
            json!({
                "name": table.name,
                "columns": table.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "indexes": table.all_indexes().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "user": config.user,
        "catalog_version": snapshot.version(),
        "tables": tables,
    })
}

/// Load config, set up logging and build the engine from the catalog file.
fn boot(config_path: &Path) -> CliResult<(Config, Engine)> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("catalog_path", &config.catalog_path), ("user", &config.user)],
    );

    let catalog_path = config.catalog_file(config_path);
    let catalog = CatalogFile::load(&catalog_path)?;
    let mut engine = Engine::new();
    catalog.apply(&mut engine)?;

    let tables = catalog.tables.len().to_string();
    let grants = catalog.grants.len().to_string();
    log_event_with_fields(
        Event::CatalogLoaded,
        &[("tables", &tables), ("grants", &grants)],
    );

    Ok((config, engine))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use crate::planner::{Expr, OrderBy};
    use tempfile::TempDir;

    fn write_catalog(temp_dir: &TempDir) {
        let catalog = json!({
            "tables": [{
                "name": "t",
                "columns": [{"name": "a", "type": "int"}, {"name": "b", "type": "int"}],
                "primary_key": ["a"],
                "indexes": [{"name": "b_desc", "columns": [{"column": "b", "direction": "desc"}]}],
                "rows": [[1, 9], [2, 8], [3, 7]]
            }],
            "grants": [{"table": "t", "user": "reader", "privileges": ["SELECT"]}]
        });
        fs::write(temp_dir.path().join("catalog.json"), catalog.to_string()).unwrap();
    }

    fn create_config(temp_dir: &TempDir, config: Value) -> PathBuf {
        let config_path = temp_dir.path().join("kvsql.json");
        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({"catalog_path": "catalog.json"}));

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.user, "root");
        assert_eq!(config.log_level, "info");
        assert!(!config.debug_explain);
        assert_eq!(
            config.catalog_file(&config_path),
            temp_dir.path().join("catalog.json")
        );
    }

    #[test]
    fn test_config_rejects_unknown_log_level() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(
            &temp_dir,
            json!({"catalog_path": "catalog.json", "log_level": "verbose"}),
        );

        let err = Config::load(&config_path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_config_rejects_empty_catalog_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({"catalog_path": " "}));
        assert!(Config::load(&config_path).is_err());
    }

    #[test]
    fn test_missing_catalog_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir, json!({"catalog_path": "absent.json"}));

        let err = boot(&config_path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::CatalogError);
    }

    #[test]
    fn test_boot_and_explain() {
        let temp_dir = TempDir::new().unwrap();
        write_catalog(&temp_dir);
        let config_path = create_config(
            &temp_dir,
            json!({"catalog_path": "catalog.json", "log_level": "error"}),
        );

        let (config, engine) = boot(&config_path).unwrap();
        let stmt = SelectStatement::from_table("t")
            .columns(["a", "b"])
            .order_by(OrderBy::desc(Expr::col("b")));

        let data = explain_statement(&engine, &config.user, &stmt, false).unwrap();
        assert_eq!(data["plan"], json!(["0 scan t@b_desc"]));

        let data = query_statement(&engine, "reader", &stmt).unwrap();
        assert_eq!(data["rows"], json!([[1, 9], [2, 8], [3, 7]]));
        assert_eq!(data["columns"], json!(["a", "b"]));
    }

    #[test]
    fn test_explain_debug_trace() {
        let temp_dir = TempDir::new().unwrap();
        write_catalog(&temp_dir);
        let config_path = create_config(
            &temp_dir,
            json!({"catalog_path": "catalog.json", "log_level": "error"}),
        );

        let (config, engine) = boot(&config_path).unwrap();
        let stmt = SelectStatement::from_table("t").columns(["a"]);
        let data = explain_statement(&engine, &config.user, &stmt, true).unwrap();
        assert_eq!(
            data["trace"],
            json!([
                "0 /t/primary/1 NULL false",
                "0 /t/primary/1/b 9 true",
                "1 /t/primary/2 NULL false",
                "1 /t/primary/2/b 8 true",
                "2 /t/primary/3 NULL false",
                "2 /t/primary/3/b 7 true",
            ])
        );
    }

    #[test]
    fn test_denied_user_gets_statement_error() {
        let temp_dir = TempDir::new().unwrap();
        write_catalog(&temp_dir);
        let config_path = create_config(
            &temp_dir,
            json!({"catalog_path": "catalog.json", "log_level": "error"}),
        );

        let (_, engine) = boot(&config_path).unwrap();
        let stmt = SelectStatement::from_table("t").columns(["a"]);
        let err = query_statement(&engine, "mallory", &stmt).unwrap_err();
        assert_eq!(err.code_str(), "SQL_PERMISSION_DENIED");
    }

    #[test]
    fn test_check_report() {
        let temp_dir = TempDir::new().unwrap();
        write_catalog(&temp_dir);
        let config_path = create_config(
            &temp_dir,
            json!({"catalog_path": "catalog.json", "log_level": "error"}),
        );

        let (config, engine) = boot(&config_path).unwrap();
        let report = check_report(&config, &engine);
        assert_eq!(report["tables"][0]["name"], "t");
        assert_eq!(report["tables"][0]["indexes"], json!(["primary", "b_desc"]));
        assert_eq!(report["user"], "root");
    }
}
