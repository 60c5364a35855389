//! Row sorting for query execution
//!
//! Sorts rows by an ordering requirement, deterministically.

use std::cmp::Ordering;

use crate::catalog::{ColumnId, Direction};
use crate::kv::Datum;
use crate::planner::OrderingRequirement;

use super::errors::ExecutorResult;
use super::eval::{RowLayout, ScalarEvaluator};

/// Sorts result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts rows laid out as `columns` according to `ordering`.
    ///
    /// Sort keys are evaluated once per row. Sort is stable, so rows with
    /// equal keys keep their scan order.
    pub fn sort(
        rows: &mut Vec<Vec<Datum>>,
        ordering: &OrderingRequirement,
        columns: &[ColumnId],
    ) -> ExecutorResult<()> {
        let keys: Vec<_> = ordering.columns().iter().map(|c| c.reference.to_expr()).collect();
        let directions: Vec<Direction> = ordering.columns().iter().map(|c| c.direction).collect();

        let mut keyed = rows
            .drain(..)
            .map(|row| {
                let evaluator = ScalarEvaluator::new(RowLayout::Columns(columns), &row);
                let values = keys
                    .iter()
                    .map(|key| evaluator.eval(key))
                    .collect::<ExecutorResult<Vec<_>>>()?;
                Ok((values, row))
            })
            .collect::<ExecutorResult<Vec<_>>>()?;

        keyed.sort_by(|(a, _), (b, _)| Self::compare_keys(a, b, &directions));
        rows.extend(keyed.into_iter().map(|(_, row)| row));
        Ok(())
    }

    /// Compares two key tuples column by column.
    ///
    /// NULL sorts first ascending and last descending, matching index order.
    fn compare_keys(a: &[Datum], b: &[Datum], directions: &[Direction]) -> Ordering {
        for ((x, y), direction) in a.iter().zip(b.iter()).zip(directions.iter()) {
            let ordering = match direction {
                Direction::Ascending => x.cmp(y),
                Direction::Descending => y.cmp(x),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{ColumnReference, ResolvedTarget};

    fn requirement(cols: &[(ColumnId, Direction)]) -> OrderingRequirement {
        OrderingRequirement::build(cols.iter().map(|(id, dir)| {
            (
                ResolvedTarget {
                    reference: ColumnReference::Physical(*id),
                    label: id.to_string(),
                    output_index: None,
                },
                *dir,
            )
        }))
    }

    fn rows(values: &[(i64, i64)]) -> Vec<Vec<Datum>> {
        values
            .iter()
            .map(|(a, b)| vec![Datum::Int(*a), Datum::Int(*b)])
            .collect()
    }

    #[test]
    fn test_multi_key_mixed_direction() {
        let mut data = rows(&[(1, 1), (2, 5), (1, 3), (2, 4)]);
        ResultSorter::sort(
            &mut data,
            &requirement(&[(1, Direction::Ascending), (2, Direction::Descending)]),
            &[1, 2],
        )
        .unwrap();
        assert_eq!(data, rows(&[(1, 3), (1, 1), (2, 5), (2, 4)]));
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let mut data = rows(&[(1, 9), (0, 8), (1, 7)]);
        ResultSorter::sort(&mut data, &requirement(&[(1, Direction::Ascending)]), &[1, 2]).unwrap();
        assert_eq!(data, rows(&[(0, 8), (1, 9), (1, 7)]));
    }

    #[test]
    fn test_nulls_first_ascending() {
        let mut data = vec![vec![Datum::Int(1)], vec![Datum::Null]];
        ResultSorter::sort(&mut data, &requirement(&[(1, Direction::Ascending)]), &[1]).unwrap();
        assert_eq!(data[0], vec![Datum::Null]);

        ResultSorter::sort(&mut data, &requirement(&[(1, Direction::Descending)]), &[1]).unwrap();
        assert_eq!(data[1], vec![Datum::Null]);
    }
}
