//! JSON I/O handling for CLI
//!
//! - Input: one JSON statement via stdin
//! - Output: one JSON object via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::Value;

use crate::planner::SelectStatement;

use super::errors::{CliError, CliResult};

/// Read a statement from stdin
pub fn read_statement() -> CliResult<SelectStatement> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_statement(&input)
}

/// Parse a statement from JSON text
pub fn parse_statement(input: &str) -> CliResult<SelectStatement> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_value(&serde_json::json!({
        "status": "ok",
        "data": data
    }))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_value(&serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    }))
}

fn write_value(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statement() {
        let stmt = parse_statement(
            r#"{
                "from": {"name": "t"},
                "targets": [{"expr": {"column": "a"}}],
                "order_by": [{"expr": {"int": 1}, "direction": "desc"}]
            }"#,
        );
        assert!(stmt.is_ok(), "{:?}", stmt.err());
    }

    #[test]
    fn test_parse_empty_input() {
        let err = parse_statement("  \n").unwrap_err();
        assert_eq!(err.code_str(), "CLI_IO_ERROR");
    }
}
