//! Scalar expression evaluation
//!
//! NULL propagates through arithmetic and comparisons. AND and OR use
//! three-valued logic. A filter keeps a row only when it evaluates to TRUE.

use std::cmp::Ordering;

use crate::catalog::{ColumnId, TableDescriptor};
use crate::kv::Datum;
use crate::planner::{BinaryOp, ScalarExpr, UnaryOp};

use super::errors::{ExecutorError, ExecutorResult};

/// Maps column ids to row positions.
#[derive(Debug, Clone, Copy)]
pub enum RowLayout<'r> {
    /// Table-width row in column order
    Table(&'r TableDescriptor),
    /// Row laid out as the listed columns
    Columns(&'r [ColumnId]),
}

impl<'r> RowLayout<'r> {
    fn position(&self, column: ColumnId) -> Option<usize> {
        match self {
            RowLayout::Table(table) => table.column_position(column),
            RowLayout::Columns(columns) => columns.iter().position(|c| *c == column),
        }
    }
}

/// Evaluates expressions against a single row
pub struct ScalarEvaluator<'r> {
    layout: RowLayout<'r>,
    row: &'r [Datum],
}

impl<'r> ScalarEvaluator<'r> {
    pub fn new(layout: RowLayout<'r>, row: &'r [Datum]) -> Self {
        Self { layout, row }
    }

    /// Returns true only if the filter evaluates to TRUE.
    pub fn matches(&self, filter: &ScalarExpr) -> ExecutorResult<bool> {
        match self.eval(filter)? {
            Datum::Bool(b) => Ok(b),
            Datum::Null => Ok(false),
            other => Err(ExecutorError::evaluation_failed(format!(
                "filter evaluated to non-boolean value {}",
                other
            ))),
        }
    }

    pub fn eval(&self, expr: &ScalarExpr) -> ExecutorResult<Datum> {
        match expr {
            ScalarExpr::Column(id) => Ok(self
                .layout
                .position(*id)
                .and_then(|pos| self.row.get(pos))
                .cloned()
                .unwrap_or(Datum::Null)),
            ScalarExpr::Literal(datum) => Ok(datum.clone()),
            ScalarExpr::Unary { op, operand } => Self::unary(*op, self.eval(operand)?),
            ScalarExpr::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => {
                let left = self.eval_bool(lhs)?;
                if left == Some(false) {
                    return Ok(Datum::Bool(false));
                }
                Ok(match (left, self.eval_bool(rhs)?) {
                    (_, Some(false)) => Datum::Bool(false),
                    (Some(true), Some(true)) => Datum::Bool(true),
                    _ => Datum::Null,
                })
            }
            ScalarExpr::Binary {
                op: BinaryOp::Or,
                lhs,
                rhs,
            } => {
                let left = self.eval_bool(lhs)?;
                if left == Some(true) {
                    return Ok(Datum::Bool(true));
                }
                Ok(match (left, self.eval_bool(rhs)?) {
                    (_, Some(true)) => Datum::Bool(true),
                    (Some(false), Some(false)) => Datum::Bool(false),
                    _ => Datum::Null,
                })
            }
            ScalarExpr::Binary { op, lhs, rhs } => {
                Self::binary(*op, self.eval(lhs)?, self.eval(rhs)?)
            }
        }
    }

    fn eval_bool(&self, expr: &ScalarExpr) -> ExecutorResult<Option<bool>> {
        match self.eval(expr)? {
            Datum::Bool(b) => Ok(Some(b)),
            Datum::Null => Ok(None),
            other => Err(ExecutorError::evaluation_failed(format!(
                "expected boolean, got {}",
                other
            ))),
        }
    }

    fn unary(op: UnaryOp, value: Datum) -> ExecutorResult<Datum> {
        match (op, value) {
            (_, Datum::Null) => Ok(Datum::Null),
            (UnaryOp::Negate, Datum::Int(v)) => v
                .checked_neg()
                .map(Datum::Int)
                .ok_or_else(|| ExecutorError::evaluation_failed("integer out of range")),
            (UnaryOp::Negate, Datum::Float(v)) => Ok(Datum::Float(-v)),
            (UnaryOp::Plus, v @ (Datum::Int(_) | Datum::Float(_))) => Ok(v),
            (UnaryOp::Not, Datum::Bool(b)) => Ok(Datum::Bool(!b)),
            (op, v) => Err(ExecutorError::evaluation_failed(format!(
                "unsupported unary operator: {}{}",
                op.symbol(),
                v
            ))),
        }
    }

    fn binary(op: BinaryOp, lhs: Datum, rhs: Datum) -> ExecutorResult<Datum> {
        if lhs.is_null() || rhs.is_null() {
            return Ok(Datum::Null);
        }

        match op {
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::Remainder => Self::arithmetic(op, lhs, rhs),
            BinaryOp::Equals
            | BinaryOp::NotEquals
            | BinaryOp::LessThan
            | BinaryOp::LessThanOrEqual
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterThanOrEqual => {
                let ordering = Self::compare(&lhs, &rhs)?;
                let result = match op {
                    BinaryOp::Equals => ordering == Ordering::Equal,
                    BinaryOp::NotEquals => ordering != Ordering::Equal,
                    BinaryOp::LessThan => ordering == Ordering::Less,
                    BinaryOp::LessThanOrEqual => ordering != Ordering::Greater,
                    BinaryOp::GreaterThan => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                };
                Ok(Datum::Bool(result))
            }
            BinaryOp::And | BinaryOp::Or => Err(ExecutorError::execution_failed(
                "logical operator reached arithmetic evaluation",
            )),
        }
    }

    fn arithmetic(op: BinaryOp, lhs: Datum, rhs: Datum) -> ExecutorResult<Datum> {
        match (&lhs, &rhs) {
            (Datum::Int(a), Datum::Int(b)) => {
                let (a, b) = (*a, *b);
                if matches!(op, BinaryOp::Divide | BinaryOp::Remainder) && b == 0 {
                    return Err(ExecutorError::evaluation_failed("division by zero"));
                }
                let result = match op {
                    BinaryOp::Add => a.checked_add(b),
                    BinaryOp::Subtract => a.checked_sub(b),
                    BinaryOp::Multiply => a.checked_mul(b),
                    BinaryOp::Divide => a.checked_div(b),
                    _ => a.checked_rem(b),
                };
                result
                    .map(Datum::Int)
                    .ok_or_else(|| ExecutorError::evaluation_failed("integer out of range"))
            }
            _ => match (Self::as_float(&lhs), Self::as_float(&rhs)) {
                (Some(a), Some(b)) => {
                    if matches!(op, BinaryOp::Divide | BinaryOp::Remainder) && b == 0.0 {
                        return Err(ExecutorError::evaluation_failed("division by zero"));
                    }
                    Ok(Datum::Float(match op {
                        BinaryOp::Add => a + b,
                        BinaryOp::Subtract => a - b,
                        BinaryOp::Multiply => a * b,
                        BinaryOp::Divide => a / b,
                        _ => a % b,
                    }))
                }
                _ => Err(ExecutorError::evaluation_failed(format!(
                    "unsupported binary operator: {}{}{}",
                    lhs,
                    op.symbol(),
                    rhs
                ))),
            },
        }
    }

    fn compare(lhs: &Datum, rhs: &Datum) -> ExecutorResult<Ordering> {
        match (lhs, rhs) {
            (Datum::Int(_), Datum::Float(_)) | (Datum::Float(_), Datum::Int(_)) => {
                match (Self::as_float(lhs), Self::as_float(rhs)) {
                    (Some(a), Some(b)) => Ok(a.total_cmp(&b)),
                    _ => Ok(lhs.cmp(rhs)),
                }
            }
            (Datum::Bool(_), Datum::Bool(_))
            | (Datum::Int(_), Datum::Int(_))
            | (Datum::Float(_), Datum::Float(_))
            | (Datum::String(_), Datum::String(_)) => Ok(lhs.cmp(rhs)),
            _ => Err(ExecutorError::evaluation_failed(format!(
                "cannot compare {} with {}",
                lhs, rhs
            ))),
        }
    }

    fn as_float(value: &Datum) -> Option<f64> {
        match value {
            Datum::Int(v) => Some(*v as f64),
            Datum::Float(v) => Some(*v),
            _ => None,
        }
    }
}
