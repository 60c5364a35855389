//! Index candidate evaluation
//!
//! Decides, for each index of the table, whether walking it forward or in
//! reverse yields rows in the required order, and whether its entries carry
//! every column the statement needs.

use std::cmp::Reverse;

use crate::catalog::{ColumnId, IndexDescriptor, TableDescriptor};

use super::ordering::{EqualityPin, OrderingRequirement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Natural index order satisfies the requirement
    Forward,
    /// Walking the index backwards satisfies the requirement
    Reverse,
    NoMatch,
}

impl MatchKind {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchKind::NoMatch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Forward => "forward",
            MatchKind::Reverse => "reverse",
            MatchKind::NoMatch => "none",
        }
    }
}

/// Matches an index's full key against a requirement.
///
/// Pinned requirement entries are skipped, then pinned key columns are
/// skipped. Each remaining requirement entry must equal the next remaining
/// key column, with all direction comparisons agreeing. Once every primary
/// key column is pinned or matched, each key prefix names at most one row and
/// the rest of the requirement holds trivially. Returns the kind and the
/// number of requirement entries matched against key columns.
pub fn match_ordering(
    index: &IndexDescriptor,
    primary_key: &[ColumnId],
    requirement: &OrderingRequirement,
    pins: &EqualityPin,
) -> (MatchKind, usize) {
    let required: Vec<_> = requirement
        .columns()
        .iter()
        .filter(|c| !pins.pins(c))
        .collect();
    let mut keys = index.full_key().filter(|key| !pins.contains(key.column));

    let mut kind: Option<MatchKind> = None;
    let mut fixed: Vec<ColumnId> = Vec::new();
    for (matched, want) in required.iter().enumerate() {
        if primary_key
            .iter()
            .all(|pk| pins.contains(*pk) || fixed.contains(pk))
        {
            break;
        }

        let key = match keys.next() {
            Some(key) if want.column() == Some(key.column) => key,
            _ => return (MatchKind::NoMatch, matched),
        };

        let this = if want.direction == key.direction {
            MatchKind::Forward
        } else {
            MatchKind::Reverse
        };
        match kind {
            None => kind = Some(this),
            Some(established) if established != this => return (MatchKind::NoMatch, matched),
            Some(_) => {}
        }
        fixed.push(key.column);
    }

    (kind.unwrap_or(MatchKind::Forward), fixed.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCandidate<'a> {
    pub index: &'a IndexDescriptor,
    pub kind: MatchKind,
    pub matched: usize,
    /// Entries carry every needed column without a primary lookup
    pub covering: bool,
}

impl<'a> IndexCandidate<'a> {
    pub fn needs_lookup(&self) -> bool {
        !self.covering
    }
}

/// Evaluates the indexes of one table. Candidates borrow from the table
/// (`'t`), not from the per-statement pins and column list (`'s`).
pub struct CandidateEvaluator<'t, 's> {
    table: &'t TableDescriptor,
    primary_key: Vec<ColumnId>,
    pins: &'s EqualityPin,
    needed: &'s [ColumnId],
}

impl<'t, 's> CandidateEvaluator<'t, 's> {
    pub fn new(table: &'t TableDescriptor, pins: &'s EqualityPin, needed: &'s [ColumnId]) -> Self {
        Self {
            table,
            primary_key: table.primary_key_columns(),
            pins,
            needed,
        }
    }

    pub fn evaluate(&self, index: &'t IndexDescriptor, requirement: &OrderingRequirement) -> IndexCandidate<'t> {
        let (kind, matched) = match_ordering(index, &self.primary_key, requirement, self.pins);
        IndexCandidate {
            index,
            kind,
            matched,
            covering: self.needed.iter().all(|c| index.contains_column(*c)),
        }
    }

    /// Every index, primary first.
    pub fn evaluate_all(&self, requirement: &OrderingRequirement) -> Vec<IndexCandidate<'t>> {
        self.table
            .all_indexes()
            .map(|index| self.evaluate(index, requirement))
            .collect()
    }

    /// Picks the scan index.
    ///
    /// Among matching indexes: covering before non-covering, then the longest
    /// matched prefix, then the primary index, then definition order. With no
    /// matching index the primary is returned as `NoMatch` and the caller
    /// adds a sort.
    pub fn choose(&self, requirement: &OrderingRequirement) -> IndexCandidate<'t> {
        let primary = self.evaluate(&self.table.primary_index, requirement);
        self.evaluate_all(requirement)
            .into_iter()
            .filter(|c| c.kind.is_match())
            .min_by_key(|c| (!c.covering, Reverse(c.matched), !c.index.is_primary(), c.index.id))
            .unwrap_or(primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnType, Direction, IndexColumnDef, IndexDef, TableDef};
    use crate::planner::resolver::{ColumnReference, ResolvedTarget};

    fn abc() -> TableDescriptor {
        let def = TableDef::new("abc")
            .column("a", ColumnType::Int)
            .column("b", ColumnType::Int)
            .column("c", ColumnType::Int)
            .column("d", ColumnType::String)
            .primary_key(["a", "b", "c"])
            .index(IndexDef::new("ba", ["b", "a"]))
            .index(IndexDef::new("bc", ["b", "c"]).storing(["d"]));
        TableDescriptor::from_def(1, &def).unwrap()
    }

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

    const ASC: Direction = Direction::Ascending;
    const DESC: Direction = Direction::Descending;

    #[test]
    fn test_primary_prefix_forward_and_reverse() {
        let table = abc();
        let pk = table.primary_key_columns();
        let pins = EqualityPin::default();
        let primary = &table.primary_index;

        assert_eq!(match_ordering(primary, &pk, &requirement(&[(1, ASC)]), &pins), (MatchKind::Forward, 1));
        assert_eq!(
            match_ordering(primary, &pk, &requirement(&[(1, DESC), (2, DESC)]), &pins),
            (MatchKind::Reverse, 2)
        );
    }

    #[test]
    fn test_mixed_directions_do_not_match() {
        let table = abc();
        let pk = table.primary_key_columns();
        let pins = EqualityPin::default();
        let (kind, _) = match_ordering(&table.primary_index, &pk, &requirement(&[(1, ASC), (2, DESC)]), &pins);
        assert_eq!(kind, MatchKind::NoMatch);
    }

    #[test]
    fn test_wrong_leading_column() {
        let table = abc();
        let pk = table.primary_key_columns();
        let pins = EqualityPin::default();
        let (kind, _) = match_ordering(&table.primary_index, &pk, &requirement(&[(2, ASC)]), &pins);
        assert_eq!(kind, MatchKind::NoMatch);
    }

    #[test]
    fn test_requirement_past_primary_key_is_redundant() {
        let def = TableDef::new("t")
            .column("a", ColumnType::Int)
            .column("b", ColumnType::Int)
            .primary_key(["a"]);
        let table = TableDescriptor::from_def(1, &def).unwrap();
        let pk = table.primary_key_columns();
        let pins = EqualityPin::default();

        // ORDER BY a, b: a is unique, so b never breaks a tie
        assert_eq!(
            match_ordering(&table.primary_index, &pk, &requirement(&[(1, ASC), (2, ASC)]), &pins),
            (MatchKind::Forward, 1)
        );
        assert_eq!(
            match_ordering(&table.primary_index, &pk, &requirement(&[(1, DESC), (2, ASC)]), &pins),
            (MatchKind::Reverse, 1)
        );
        // ORDER BY b, a still needs b first
        assert_eq!(
            match_ordering(&table.primary_index, &pk, &requirement(&[(2, ASC), (1, ASC)]), &pins).0,
            MatchKind::NoMatch
        );
    }

    #[test]
    fn test_requirement_past_secondary_key_without_primary() {
        let def = TableDef::new("t")
            .column("a", ColumnType::Int)
            .column("b", ColumnType::Int)
            .column("c", ColumnType::Int)
            .primary_key(["a"])
            .index(IndexDef::new("b_idx", ["b"]).unique());
        let table = TableDescriptor::from_def(1, &def).unwrap();
        let pk = table.primary_key_columns();
        let index = table.find_index("b_idx").unwrap();
        let pins = EqualityPin::default();

        // Unique b still admits repeated NULLs, so c has to follow in the key
        assert_eq!(
            match_ordering(index, &pk, &requirement(&[(2, ASC), (3, ASC)]), &pins).0,
            MatchKind::NoMatch
        );
        // b then the implicit a fixes the row, so c is redundant
        assert_eq!(
            match_ordering(index, &pk, &requirement(&[(2, DESC), (1, DESC), (3, ASC)]), &pins),
            (MatchKind::Reverse, 2)
        );
    }

    #[test]
    fn test_pinned_primary_key_satisfies_any_order() {
        use crate::kv::Datum;
        use crate::planner::ast::BinaryOp;
        use crate::planner::expr::ScalarExpr;

        let def = TableDef::new("t")
            .column("a", ColumnType::Int)
            .column("b", ColumnType::Int)
            .primary_key(["a"]);
        let table = TableDescriptor::from_def(1, &def).unwrap();
        let pk = table.primary_key_columns();
        // WHERE a = 3 ORDER BY b DESC
        let filter = ScalarExpr::Binary {
            op: BinaryOp::Equals,
            lhs: Box::new(ScalarExpr::Column(1)),
            rhs: Box::new(ScalarExpr::Literal(Datum::Int(3))),
        };
        let pins = EqualityPin::from_filter(Some(&filter));
        assert_eq!(
            match_ordering(&table.primary_index, &pk, &requirement(&[(2, DESC)]), &pins),
            (MatchKind::Forward, 0)
        );
    }

    #[test]
    fn test_implicit_suffix_extends_match() {
        let table = abc();
        let pk = table.primary_key_columns();
        let ba = table.find_index("ba").unwrap();
        let (kind, matched) = match_ordering(
            ba,
            &pk,
            &requirement(&[(2, ASC), (1, ASC), (3, ASC)]),
            &EqualityPin::default(),
        );
        assert_eq!((kind, matched), (MatchKind::Forward, 3));
    }

    #[test]
    fn test_descending_index_column() {
        let def = TableDef::new("t")
            .column("a", ColumnType::Int)
            .column("b", ColumnType::Int)
            .primary_key(["a"])
            .index(IndexDef::new("b_desc", [IndexColumnDef::desc("b")]));
        let table = TableDescriptor::from_def(1, &def).unwrap();
        let pk = table.primary_key_columns();
        let index = table.find_index("b_desc").unwrap();
        let pins = EqualityPin::default();

        assert_eq!(match_ordering(index, &pk, &requirement(&[(2, DESC)]), &pins).0, MatchKind::Forward);
        assert_eq!(match_ordering(index, &pk, &requirement(&[(2, ASC)]), &pins).0, MatchKind::Reverse);
        // b DESC, then implicit a ASC
        assert_eq!(
            match_ordering(index, &pk, &requirement(&[(2, ASC), (1, DESC)]), &pins).0,
            MatchKind::Reverse
        );
    }

    #[test]
    fn test_pinned_columns_are_skipped() {
        use crate::kv::Datum;
        use crate::planner::ast::BinaryOp;
        use crate::planner::expr::ScalarExpr;

        let table = abc();
        let pk = table.primary_key_columns();
        // WHERE a = 1 ORDER BY b, c
        let filter = ScalarExpr::Binary {
            op: BinaryOp::Equals,
            lhs: Box::new(ScalarExpr::Column(1)),
            rhs: Box::new(ScalarExpr::Literal(Datum::Int(1))),
        };
        let pins = EqualityPin::from_filter(Some(&filter));
        let (kind, matched) = match_ordering(
            &table.primary_index,
            &pk,
            &requirement(&[(2, ASC), (3, ASC)]),
            &pins,
        );
        assert_eq!((kind, matched), (MatchKind::Forward, 2));

        // ORDER BY a DESC, b ASC with a pinned: only b's direction counts
        let (kind, _) = match_ordering(
            &table.primary_index,
            &pk,
            &requirement(&[(1, DESC), (2, ASC)]),
            &pins,
        );
        assert_eq!(kind, MatchKind::Forward);
    }

    #[test]
    fn test_fully_pinned_requirement_is_forward() {
        use crate::kv::Datum;
        use crate::planner::ast::BinaryOp;
        use crate::planner::expr::ScalarExpr;

        let table = abc();
        let pk = table.primary_key_columns();
        let filter = ScalarExpr::Binary {
            op: BinaryOp::Equals,
            lhs: Box::new(ScalarExpr::Column(4)),
            rhs: Box::new(ScalarExpr::Literal(Datum::from("x"))),
        };
        let pins = EqualityPin::from_filter(Some(&filter));
        let (kind, matched) = match_ordering(&table.primary_index, &pk, &requirement(&[(4, DESC)]), &pins);
        assert_eq!((kind, matched), (MatchKind::Forward, 0));
    }

    #[test]
    fn test_choose_prefers_covering_secondary() {
        let table = abc();
        let pins = EqualityPin::default();
        let needed = [1, 2];
        let evaluator = CandidateEvaluator::new(&table, &pins, &needed);

        let chosen = evaluator.choose(&requirement(&[(2, ASC), (1, ASC)]));
        assert_eq!(chosen.index.name, "ba");
        assert_eq!(chosen.kind, MatchKind::Forward);
        assert!(chosen.covering);
    }

    #[test]
    fn test_choose_prefers_covering_index() {
        let table = abc();
        let pins = EqualityPin::default();
        // d is stored only in bc
        let needed = [2, 3, 4];
        let evaluator = CandidateEvaluator::new(&table, &pins, &needed);

        let chosen = evaluator.choose(&requirement(&[(2, ASC)]));
        assert_eq!(chosen.index.name, "bc");
        assert!(!chosen.needs_lookup());
    }

    #[test]
    fn test_choose_non_covering_match_over_primary_sort() {
        let table = abc();
        let pins = EqualityPin::default();
        let needed = [1, 2, 4];
        let evaluator = CandidateEvaluator::new(&table, &pins, &needed);

        let chosen = evaluator.choose(&requirement(&[(2, ASC), (1, ASC)]));
        assert_eq!(chosen.index.name, "ba");
        assert!(chosen.needs_lookup());
    }

    #[test]
    fn test_choose_falls_back_to_primary() {
        let table = abc();
        let pins = EqualityPin::default();
        let needed = [4];
        let evaluator = CandidateEvaluator::new(&table, &pins, &needed);

        let chosen = evaluator.choose(&requirement(&[(4, ASC)]));
        assert!(chosen.index.is_primary());
        assert_eq!(chosen.kind, MatchKind::NoMatch);
    }

    #[test]
    fn test_empty_requirement_picks_primary() {
        let table = abc();
        let pins = EqualityPin::default();
        let needed = [2];
        let evaluator = CandidateEvaluator::new(&table, &pins, &needed);

        let chosen = evaluator.choose(&OrderingRequirement::default());
        assert!(chosen.index.is_primary());
        assert_eq!(chosen.kind, MatchKind::Forward);
    }

    #[test]
    fn test_evaluate_all_lists_every_index() {
        let table = abc();
        let pins = EqualityPin::default();
        let needed = [1];
        let evaluator = CandidateEvaluator::new(&table, &pins, &needed);
        let all = evaluator.evaluate_all(&requirement(&[(1, ASC)]));
        let kinds: Vec<MatchKind> = all.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![MatchKind::Forward, MatchKind::NoMatch, MatchKind::NoMatch]);
    }
}
