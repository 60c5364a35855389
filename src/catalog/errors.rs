//! Catalog error types

use thiserror::Error;

use crate::privilege::PrivilegeError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Schema catalog failures. All of them are fatal for the current statement
/// only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("table \"{0}\" not found")]
    TableNotFound(String),

    #[error("table \"{0}\" already exists")]
    TableExists(String),

    #[error("table \"{0}\" must have at least one column")]
    NoColumns(String),

    #[error("duplicate column name: \"{column}\" in table \"{table}\"")]
    DuplicateColumn { table: String, column: String },

    #[error("column \"{column}\" does not exist in table \"{table}\"")]
    ColumnNotFound { table: String, column: String },

    #[error("table \"{0}\" must have a primary key")]
    MissingPrimaryKey(String),

    #[error("duplicate index name: \"{index}\" on table \"{table}\"")]
    DuplicateIndex { table: String, index: String },

    #[error("invalid index \"{index}\": {reason}")]
    InvalidIndex { index: String, reason: String },

    #[error("invalid privileges on table \"{table}\": {source}")]
    InvalidPrivileges {
        table: String,
        #[source]
        source: PrivilegeError,
    },
}
