//! Observability events for kvsql
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in kvsql
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Catalog file applied: tables created, rows written, grants applied
    CatalogLoaded,

    // Schema and data
    TableCreated,
    RowsInserted,

    // Planning
    /// Plan built; carries index, direction and sort decision
    PlanBuilt,
    /// Planning failed with a resolution or catalog error
    PlanRejected,

    // Execution
    QueryExecuted,
    /// User lacks SELECT on the table
    PrivilegeDenied,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::TableCreated => "TABLE_CREATED",
            Event::RowsInserted => "ROWS_INSERTED",
            Event::PlanBuilt => "PLAN_BUILT",
            Event::PlanRejected => "PLAN_REJECTED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::PrivilegeDenied => "PRIVILEGE_DENIED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PlanRejected | Event::PrivilegeDenied => Severity::Warn,
            Event::RowsInserted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        let events = [
            Event::ConfigLoaded,
            Event::CatalogLoaded,
            Event::TableCreated,
            Event::RowsInserted,
            Event::PlanBuilt,
            Event::PlanRejected,
            Event::QueryExecuted,
            Event::PrivilegeDenied,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_rejections_are_warnings() {
        assert_eq!(Event::PlanRejected.severity(), Severity::Warn);
        assert_eq!(Event::PrivilegeDenied.severity(), Severity::Warn);
        assert_eq!(Event::PlanBuilt.severity(), Severity::Info);
    }
}
