//! KV write errors

use thiserror::Error;

use super::datum::Datum;

pub type KvResult<T> = Result<T, KvError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvError {
    #[error("table \"{table}\" expects {expected} values, got {got}")]
    ArityMismatch {
        table: String,
        expected: usize,
        got: usize,
    },

    #[error("value {value} does not match type of column \"{column}\"")]
    TypeMismatch { column: String, value: Datum },

    #[error("null value in primary key column \"{0}\"")]
    NullPrimaryKey(String),

    #[error("duplicate key value violates unique index \"{index}\" on \"{table}\"")]
    DuplicateKey { table: String, index: String },
}
