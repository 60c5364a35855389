//! Executor error types
//!
//! Error codes:
//! - SQL_EXECUTION_FAILED (ERROR)
//! - SQL_EVALUATION_FAILED (ERROR)
//! - SQL_DATA_CORRUPTION (FATAL)

use std::fmt;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Statement failed but the store is healthy
    Error,
    /// Stored data is inconsistent
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// General execution failure
    ExecutionFailed,
    /// Expression could not be evaluated (type mismatch, overflow, division by zero)
    EvaluationFailed,
    /// Index entry without a matching primary row
    DataCorruption,
}

impl ExecutorErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::ExecutionFailed => "SQL_EXECUTION_FAILED",
            ExecutorErrorCode::EvaluationFailed => "SQL_EVALUATION_FAILED",
            ExecutorErrorCode::DataCorruption => "SQL_DATA_CORRUPTION",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
    /// Pretty-printed KV key if applicable
    key: Option<String>,
}

impl ExecutorError {
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::ExecutionFailed,
            message: reason.into(),
            key: None,
        }
    }

    pub fn evaluation_failed(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::EvaluationFailed,
            message: reason.into(),
            key: None,
        }
    }

    /// Create a data corruption error (FATAL)
    pub fn data_corruption(key: impl Into<String>, reason: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            code: ExecutorErrorCode::DataCorruption,
            message: format!("data corruption at {}: {}", key, reason.into()),
            key: Some(key),
        }
    }

    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
