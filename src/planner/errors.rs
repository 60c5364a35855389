//! Planner errors
//!
//! Every failure is reported before any plan node is produced. The message
//! texts are part of the user-visible contract.

use thiserror::Error;

use crate::catalog::CatalogError;

pub type PlannerResult<T> = Result<T, PlannerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// Ordinal ORDER BY target outside `1..=n` visible outputs
    #[error("invalid ORDER BY index: {index} not in range [1, {len}]")]
    OrdinalOutOfRange { index: i64, len: usize },

    /// ORDER BY target that is neither a column, an ordinal nor an
    /// expression over columns
    #[error("invalid ORDER BY: {0}")]
    InvalidOrderBy(String),

    /// Name that matches no output alias and no table column
    #[error("qualified name \"{0}\" not found")]
    NameNotFound(String),

    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("SELECT requires a FROM clause")]
    MissingFrom,

    #[error("empty select list")]
    EmptySelect,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Broken planner invariant, never caused by the statement itself
    #[error("internal planner error: {0}")]
    Internal(String),
}

impl PlannerError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            PlannerError::OrdinalOutOfRange { .. } => "SQL_INVALID_ORDER_BY_INDEX",
            PlannerError::InvalidOrderBy(_) => "SQL_INVALID_ORDER_BY",
            PlannerError::NameNotFound(_) => "SQL_NAME_NOT_FOUND",
            PlannerError::UnsupportedExpression(_) => "SQL_UNSUPPORTED_EXPRESSION",
            PlannerError::MissingFrom => "SQL_MISSING_FROM",
            PlannerError::EmptySelect => "SQL_EMPTY_SELECT",
            PlannerError::Catalog(CatalogError::TableNotFound(_)) => "SQL_TABLE_NOT_FOUND",
            PlannerError::Catalog(_) => "SQL_CATALOG",
            PlannerError::Internal(_) => "SQL_INTERNAL",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, PlannerError::Internal(_))
    }
}
