//! Name and ordinal resolution
//!
//! Binds the select list, the filter and each ORDER BY target to table
//! columns. ORDER BY names look at output names first and table columns
//! second; qualified names and filters see table columns only.

use crate::catalog::{names_match, ColumnId, TableDescriptor};
use crate::kv::Datum;

use super::ast::{Expr, SelectTarget, TableRef};
use super::errors::{PlannerError, PlannerResult};
use super::expr::ScalarExpr;

/// One column of the statement's result.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub name: String,
    pub expr: ScalarExpr,
}

/// Resolved select list, in output order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    columns: Vec<OutputColumn>,
}

impl Projection {
    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// True if every output is a bare column.
    pub fn is_plain(&self) -> bool {
        self.columns.iter().all(|c| c.expr.as_column().is_some())
    }

    /// First output whose name matches.
    pub fn find_by_name(&self, name: &str, quoted: bool) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| names_match(&c.name, name, quoted))
    }

    /// First output computing exactly `expr`.
    pub fn position_of(&self, expr: &ScalarExpr) -> Option<usize> {
        self.columns.iter().position(|c| &c.expr == expr)
    }

    fn push(&mut self, name: String, expr: ScalarExpr) {
        self.columns.push(OutputColumn { name, expr });
    }
}

/// What an ordering column sorts by.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnReference {
    /// A stored table column
    Physical(ColumnId),
    /// An expression over one or more columns
    Computed(ScalarExpr),
}

impl ColumnReference {
    pub fn column(&self) -> Option<ColumnId> {
        match self {
            ColumnReference::Physical(id) => Some(*id),
            ColumnReference::Computed(_) => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, ColumnReference::Computed(_))
    }

    pub fn to_expr(&self) -> ScalarExpr {
        match self {
            ColumnReference::Physical(id) => ScalarExpr::Column(*id),
            ColumnReference::Computed(expr) => expr.clone(),
        }
    }
}

impl From<ScalarExpr> for ColumnReference {
    fn from(expr: ScalarExpr) -> Self {
        match expr {
            ScalarExpr::Column(id) => ColumnReference::Physical(id),
            other => ColumnReference::Computed(other),
        }
    }
}

/// A bound ORDER BY target.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub reference: ColumnReference,
    /// Name shown in explain output
    pub label: String,
    /// Visible output already producing this value, if any
    pub output_index: Option<usize>,
}

pub struct Resolver<'a> {
    table: &'a TableDescriptor,
    source: &'a TableRef,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a TableDescriptor, source: &'a TableRef) -> Self {
        Self { table, source }
    }

    /// Resolves the select list. `*` expands to every table column.
    pub fn resolve_select_list(&self, targets: &[SelectTarget]) -> PlannerResult<Projection> {
        if targets.is_empty() {
            return Err(PlannerError::EmptySelect);
        }

        let mut projection = Projection::default();
        for target in targets {
            if target.expr == Expr::Star {
                for column in &self.table.columns {
                    projection.push(column.name.clone(), ScalarExpr::Column(column.id));
                }
                continue;
            }

            let expr = self.resolve_scalar(&target.expr)?;
            let name = match (&target.alias, expr.as_column()) {
                (Some(alias), _) => alias.clone(),
                (None, Some(id)) => self.table.column_name(id).to_string(),
                (None, None) => target.expr.to_string(),
            };
            projection.push(name, expr);
        }
        Ok(projection)
    }

    pub fn resolve_filter(&self, filter: Option<&Expr>) -> PlannerResult<Option<ScalarExpr>> {
        filter.map(|expr| self.resolve_scalar(expr)).transpose()
    }

    /// Resolves an expression against table columns only.
    pub fn resolve_scalar(&self, expr: &Expr) -> PlannerResult<ScalarExpr> {
        match expr {
            Expr::Column(name) => self.column(name, false),
            Expr::Quoted(name) => self.column(name, true),
            Expr::Qualified { table, column } => {
                let visible = self.source.alias.as_deref().unwrap_or(&self.source.name);
                if !names_match(visible, table, false) {
                    return Err(PlannerError::NameNotFound(expr.to_string()));
                }
                self.table
                    .find_column(column, false)
                    .map(|c| ScalarExpr::Column(c.id))
                    .ok_or_else(|| PlannerError::NameNotFound(expr.to_string()))
            }
            Expr::Star => Err(PlannerError::UnsupportedExpression(expr.to_string())),
            Expr::Int(v) => Ok(ScalarExpr::Literal(Datum::Int(*v))),
            Expr::Float(v) => Ok(ScalarExpr::Literal(Datum::Float(*v))),
            Expr::String(s) => Ok(ScalarExpr::Literal(Datum::String(s.clone()))),
            Expr::Bool(b) => Ok(ScalarExpr::Literal(Datum::Bool(*b))),
            Expr::Null => Ok(ScalarExpr::Literal(Datum::Null)),
            Expr::Paren(inner) => self.resolve_scalar(inner),
            Expr::Unary { op, operand } => Ok(ScalarExpr::Unary {
                op: *op,
                operand: Box::new(self.resolve_scalar(operand)?),
            }),
            Expr::Binary { op, lhs, rhs } => Ok(ScalarExpr::Binary {
                op: *op,
                lhs: Box::new(self.resolve_scalar(lhs)?),
                rhs: Box::new(self.resolve_scalar(rhs)?),
            }),
        }
    }

    fn column(&self, name: &str, quoted: bool) -> PlannerResult<ScalarExpr> {
        self.table
            .find_column(name, quoted)
            .map(|c| ScalarExpr::Column(c.id))
            .ok_or_else(|| PlannerError::NameNotFound(name.to_string()))
    }

    /// Binds one ORDER BY target.
    ///
    /// A bare integer is a 1-based ordinal into the visible outputs. Names
    /// match output names before table columns. Literals, `*` and
    /// expressions without any column reference are rejected.
    pub fn resolve_order_target(
        &self,
        expr: &Expr,
        projection: &Projection,
    ) -> PlannerResult<ResolvedTarget> {
        if let Expr::Int(ordinal) = expr {
            return self.resolve_ordinal(*ordinal, projection);
        }

        match expr.unwrap_parens() {
            Expr::Column(name) => self.resolve_name(name, false, projection),
            Expr::Quoted(name) => self.resolve_name(name, true, projection),
            inner @ Expr::Qualified { .. } => {
                let scalar = self.resolve_scalar(inner)?;
                Ok(self.bind(scalar, projection))
            }
            inner @ (Expr::Unary { .. } | Expr::Binary { .. }) => {
                let scalar = self.resolve_scalar(inner)?;
                if scalar.is_constant() {
                    return Err(PlannerError::InvalidOrderBy(expr.to_string()));
                }
                Ok(self.bind(scalar, projection))
            }
            _ => Err(PlannerError::InvalidOrderBy(expr.to_string())),
        }
    }

    fn resolve_ordinal(&self, ordinal: i64, projection: &Projection) -> PlannerResult<ResolvedTarget> {
        let len = projection.len();
        if ordinal < 1 || ordinal as u64 > len as u64 {
            return Err(PlannerError::OrdinalOutOfRange {
                index: ordinal,
                len,
            });
        }
        Ok(Self::from_output(ordinal as usize - 1, projection))
    }

    fn resolve_name(
        &self,
        name: &str,
        quoted: bool,
        projection: &Projection,
    ) -> PlannerResult<ResolvedTarget> {
        if let Some(index) = projection.find_by_name(name, quoted) {
            return Ok(Self::from_output(index, projection));
        }
        let scalar = self.column(name, quoted)?;
        Ok(self.bind(scalar, projection))
    }

    fn from_output(index: usize, projection: &Projection) -> ResolvedTarget {
        let output = &projection.columns[index];
        ResolvedTarget {
            reference: ColumnReference::from(output.expr.clone()),
            label: output.name.clone(),
            output_index: Some(index),
        }
    }

    // Reuses a visible output computing the same value when there is one.
    fn bind(&self, scalar: ScalarExpr, projection: &Projection) -> ResolvedTarget {
        match projection.position_of(&scalar) {
            Some(index) => Self::from_output(index, projection),
            None => ResolvedTarget {
                label: scalar.label(self.table),
                reference: ColumnReference::from(scalar),
                output_index: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnType, TableDef};
    use crate::planner::ast::BinaryOp;

    fn table() -> TableDescriptor {
        let def = TableDef::new("t")
            .column("a", ColumnType::Int)
            .column("b", ColumnType::Int)
            .column("Mixed", ColumnType::Int)
            .primary_key(["a"]);
        TableDescriptor::from_def(1, &def).unwrap()
    }

    fn source() -> TableRef {
        TableRef {
            name: "t".into(),
            alias: None,
        }
    }

    fn targets(names: &[&str]) -> Vec<SelectTarget> {
        names
            .iter()
            .map(|n| SelectTarget {
                expr: Expr::col(*n),
                alias: None,
            })
            .collect()
    }

    #[test]
    fn test_star_expands_to_all_columns() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        let projection = resolver
            .resolve_select_list(&[SelectTarget {
                expr: Expr::Star,
                alias: None,
            }])
            .unwrap();
        assert_eq!(projection.names(), vec!["a", "b", "Mixed"]);
        assert!(projection.is_plain());
    }

    #[test]
    fn test_ordinal() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        let projection = resolver.resolve_select_list(&targets(&["b", "a"])).unwrap();

        let target = resolver.resolve_order_target(&Expr::int(2), &projection).unwrap();
        assert_eq!(target.reference, ColumnReference::Physical(1));
        assert_eq!(target.output_index, Some(1));

        for bad in [0, 3, -1] {
            assert_eq!(
                resolver.resolve_order_target(&Expr::int(bad), &projection),
                Err(PlannerError::OrdinalOutOfRange { index: bad, len: 2 })
            );
        }
    }

    #[test]
    fn test_alias_takes_precedence_over_column() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        // SELECT a AS b ... ORDER BY b sorts by column a
        let projection = resolver
            .resolve_select_list(&[SelectTarget {
                expr: Expr::col("a"),
                alias: Some("b".into()),
            }])
            .unwrap();

        let target = resolver.resolve_order_target(&Expr::col("B"), &projection).unwrap();
        assert_eq!(target.reference, ColumnReference::Physical(1));
        assert_eq!(target.label, "b");
    }

    #[test]
    fn test_column_not_in_output_is_hidden() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        let projection = resolver.resolve_select_list(&targets(&["b"])).unwrap();

        let target = resolver.resolve_order_target(&Expr::col("a"), &projection).unwrap();
        assert_eq!(target.output_index, None);
        assert_eq!(target.label, "a");
    }

    #[test]
    fn test_quoted_names_are_exact() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        let projection = resolver.resolve_select_list(&targets(&["a"])).unwrap();

        assert!(resolver
            .resolve_order_target(&Expr::quoted("Mixed"), &projection)
            .is_ok());
        assert_eq!(
            resolver.resolve_order_target(&Expr::quoted("mixed"), &projection),
            Err(PlannerError::NameNotFound("mixed".into()))
        );
        assert!(resolver
            .resolve_order_target(&Expr::col("MIXED"), &projection)
            .is_ok());
    }

    #[test]
    fn test_qualified_names() {
        let table = table();
        let aliased = TableRef {
            name: "t".into(),
            alias: Some("x".into()),
        };
        let resolver = Resolver::new(&table, &aliased);
        let projection = resolver.resolve_select_list(&targets(&["a"])).unwrap();

        let target = resolver
            .resolve_order_target(&Expr::qualified("x", "b"), &projection)
            .unwrap();
        assert_eq!(target.reference, ColumnReference::Physical(2));
        assert_eq!(
            resolver.resolve_order_target(&Expr::qualified("t", "b"), &projection),
            Err(PlannerError::NameNotFound("t.b".into()))
        );
    }

    #[test]
    fn test_parenthesized_column() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        let projection = resolver.resolve_select_list(&targets(&["a"])).unwrap();

        let target = resolver
            .resolve_order_target(&Expr::paren(Expr::col("b")), &projection)
            .unwrap();
        assert_eq!(target.reference, ColumnReference::Physical(2));
    }

    #[test]
    fn test_rejects_literals_and_constants() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        let projection = resolver.resolve_select_list(&targets(&["a"])).unwrap();

        assert_eq!(
            resolver.resolve_order_target(&Expr::String("x".into()), &projection),
            Err(PlannerError::InvalidOrderBy("'x'".into()))
        );
        assert_eq!(
            resolver.resolve_order_target(&Expr::Star, &projection),
            Err(PlannerError::InvalidOrderBy("*".into()))
        );
        let constant = Expr::binary(BinaryOp::Add, Expr::int(1), Expr::int(2));
        assert_eq!(
            resolver.resolve_order_target(&constant, &projection),
            Err(PlannerError::InvalidOrderBy("1+2".into()))
        );
    }

    #[test]
    fn test_expression_target_is_computed() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        let projection = resolver.resolve_select_list(&targets(&["a"])).unwrap();

        let expr = Expr::binary(BinaryOp::Add, Expr::col("a"), Expr::col("b"));
        let target = resolver.resolve_order_target(&expr, &projection).unwrap();
        assert!(target.reference.is_computed());
        assert_eq!(target.label, "a+b");
    }

    #[test]
    fn test_expression_matches_computed_output() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        let sum = Expr::binary(BinaryOp::Add, Expr::col("a"), Expr::col("b"));
        let projection = resolver
            .resolve_select_list(&[SelectTarget {
                expr: sum.clone(),
                alias: Some("s".into()),
            }])
            .unwrap();

        let target = resolver.resolve_order_target(&sum, &projection).unwrap();
        assert_eq!(target.output_index, Some(0));
        assert_eq!(target.label, "s");
    }

    #[test]
    fn test_unknown_name() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        let projection = resolver.resolve_select_list(&targets(&["a"])).unwrap();

        assert_eq!(
            resolver.resolve_order_target(&Expr::col("z"), &projection),
            Err(PlannerError::NameNotFound("z".into()))
        );
    }

    #[test]
    fn test_empty_select_list() {
        let table = table();
        let source = source();
        let resolver = Resolver::new(&table, &source);
        assert_eq!(resolver.resolve_select_list(&[]), Err(PlannerError::EmptySelect));
    }
}
