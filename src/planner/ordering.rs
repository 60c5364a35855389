//! Ordering requirements
//!
//! An ordering requirement is the deduplicated list of (value, direction)
//! pairs the result must be sorted by. Equality pins record columns the
//! filter fixes to a single value; those columns cannot affect the order of
//! the rows that pass the filter.

use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::{ColumnId, Direction};

use super::ast::BinaryOp;
use super::expr::ScalarExpr;
use super::resolver::{ColumnReference, ResolvedTarget};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderingColumn {
    pub reference: ColumnReference,
    pub direction: Direction,
    pub label: String,
}

impl OrderingColumn {
    pub fn column(&self) -> Option<ColumnId> {
        self.reference.column()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderingRequirement {
    columns: Vec<OrderingColumn>,
}

impl OrderingRequirement {
    /// Builds a requirement from resolved targets in ORDER BY order.
    ///
    /// A target equal to an earlier one is dropped: once the earlier key has
    /// fixed the order between two rows, the repeat can never change it, even
    /// with the opposite direction.
    pub fn build(targets: impl IntoIterator<Item = (ResolvedTarget, Direction)>) -> Self {
        let mut columns: Vec<OrderingColumn> = Vec::new();
        for (target, direction) in targets {
            if columns.iter().any(|c| c.reference == target.reference) {
                continue;
            }
            columns.push(OrderingColumn {
                reference: target.reference,
                direction,
                label: target.label,
            });
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[OrderingColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn has_computed(&self) -> bool {
        self.columns.iter().any(|c| c.reference.is_computed())
    }
}

/// Explain detail: `+a,-b`
impl fmt::Display for OrderingRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}{}", column.direction.sign(), column.label)?;
        }
        Ok(())
    }
}

/// Columns the filter pins with `column = constant` conjuncts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EqualityPin {
    columns: BTreeSet<ColumnId>,
}

impl EqualityPin {
    pub fn from_filter(filter: Option<&ScalarExpr>) -> Self {
        let mut columns = BTreeSet::new();
        let Some(filter) = filter else {
            return Self { columns };
        };

        for conjunct in filter.conjuncts() {
            if let ScalarExpr::Binary {
                op: BinaryOp::Equals,
                lhs,
                rhs,
            } = conjunct
            {
                match (lhs.as_column(), rhs.as_column()) {
                    (Some(id), None) if rhs.is_constant() => {
                        columns.insert(id);
                    }
                    (None, Some(id)) if lhs.is_constant() => {
                        columns.insert(id);
                    }
                    _ => {}
                }
            }
        }
        Self { columns }
    }

    pub fn contains(&self, column: ColumnId) -> bool {
        self.columns.contains(&column)
    }

    /// True if the requirement entry is a pinned physical column.
    pub fn pins(&self, column: &OrderingColumn) -> bool {
        column.column().map(|id| self.contains(id)).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.iter().copied()
    }
}
