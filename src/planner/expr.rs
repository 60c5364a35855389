//! Resolved scalar expressions
//!
//! A `ScalarExpr` refers to columns by id, never by name. Two expressions are
//! the same computation exactly when they compare equal.

use crate::catalog::{ColumnId, TableDescriptor};
use crate::kv::Datum;

use super::ast::{BinaryOp, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExpr {
    Column(ColumnId),
    Literal(Datum),
    Unary {
        op: UnaryOp,
        operand: Box<ScalarExpr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<ScalarExpr>,
        rhs: Box<ScalarExpr>,
    },
}

impl ScalarExpr {
    pub fn as_column(&self) -> Option<ColumnId> {
        match self {
            ScalarExpr::Column(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Datum> {
        match self {
            ScalarExpr::Literal(datum) => Some(datum),
            _ => None,
        }
    }

    /// Appends referenced columns to `out`, skipping ones already present.
    pub fn collect_columns(&self, out: &mut Vec<ColumnId>) {
        match self {
            ScalarExpr::Column(id) => {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
            ScalarExpr::Literal(_) => {}
            ScalarExpr::Unary { operand, .. } => operand.collect_columns(out),
            ScalarExpr::Binary { lhs, rhs, .. } => {
                lhs.collect_columns(out);
                rhs.collect_columns(out);
            }
        }
    }

    pub fn columns(&self) -> Vec<ColumnId> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    /// True if the expression references no column.
    pub fn is_constant(&self) -> bool {
        match self {
            ScalarExpr::Column(_) => false,
            ScalarExpr::Literal(_) => true,
            ScalarExpr::Unary { operand, .. } => operand.is_constant(),
            ScalarExpr::Binary { lhs, rhs, .. } => lhs.is_constant() && rhs.is_constant(),
        }
    }

    /// Splits a filter into its top-level AND conjuncts.
    pub fn conjuncts(&self) -> Vec<&ScalarExpr> {
        match self {
            ScalarExpr::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => {
                let mut out = lhs.conjuncts();
                out.extend(rhs.conjuncts());
                out
            }
            other => vec![other],
        }
    }

    /// Space-free rendering with column names, e.g. `a+b`.
    pub fn label(&self, table: &TableDescriptor) -> String {
        match self {
            ScalarExpr::Column(id) => table.column_name(*id).to_string(),
            ScalarExpr::Literal(datum) => datum.to_string(),
            ScalarExpr::Unary { op, operand } => {
                format!("{}{}", op.symbol(), operand.nested_label(table))
            }
            ScalarExpr::Binary { op, lhs, rhs } => format!(
                "{}{}{}",
                lhs.nested_label(table),
                op.symbol(),
                rhs.nested_label(table)
            ),
        }
    }

    fn nested_label(&self, table: &TableDescriptor) -> String {
        match self {
            ScalarExpr::Binary { .. } => format!("({})", self.label(table)),
            _ => self.label(table),
        }
    }
}
