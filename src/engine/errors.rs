//! Engine error types

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::executor::ExecutorError;
use crate::kv::KvError;
use crate::planner::PlannerError;
use crate::privilege::Privilege;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures surfaced by [`Engine`](super::Engine) operations.
///
/// Each subsystem error passes through unchanged, so its text is the
/// diagnostic the caller sees.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Kv(#[from] KvError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("user {user} does not have {privilege} privilege on table \"{table}\"")]
    PermissionDenied {
        user: String,
        privilege: Privilege,
        table: String,
    },
}

impl EngineError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Catalog(CatalogError::TableNotFound(_)) => "SQL_TABLE_NOT_FOUND",
            EngineError::Catalog(_) => "SQL_CATALOG",
            EngineError::Planner(e) => e.code(),
            EngineError::Kv(KvError::DuplicateKey { .. }) => "SQL_DUPLICATE_KEY",
            EngineError::Kv(_) => "SQL_INVALID_ROW",
            EngineError::Executor(e) => e.code().code(),
            EngineError::PermissionDenied { .. } => "SQL_PERMISSION_DENIED",
        }
    }

    /// True for failures that point at a bug or corrupted data rather than
    /// at the statement.
    pub fn is_internal(&self) -> bool {
        match self {
            EngineError::Planner(e) => e.is_internal(),
            EngineError::Executor(e) => e.is_fatal(),
            _ => false,
        }
    }
}
