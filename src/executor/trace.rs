//! Debug explain trace
//!
//! One entry per KV a scan touches, in scan order. The output flag is `true`
//! on the last KV of a row the scan emitted, `false` on its other KVs, and
//! NULL on every KV of a row the filter rejected.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    /// Output row counter at the time the KV was read
    pub row: usize,
    pub key: String,
    pub value: String,
    pub output: Option<bool>,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let output = match self.output {
            Some(true) => "true",
            Some(false) => "false",
            None => "NULL",
        };
        write!(f, "{} {} {} {}", self.row, self.key, self.value, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let entry = TraceEntry {
            row: 0,
            key: "/t/primary/1".into(),
            value: "NULL".into(),
            output: Some(true),
        };
        assert_eq!(entry.to_string(), "0 /t/primary/1 NULL true");

        let filtered = TraceEntry {
            output: None,
            ..entry
        };
        assert_eq!(filtered.to_string(), "0 /t/primary/1 NULL NULL");
    }
}
