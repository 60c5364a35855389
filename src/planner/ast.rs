//! Statement structures consumed by the planner
//!
//! Statements arrive already parsed, either built in code or deserialized
//! from JSON. Names are kept exactly as written; the resolver decides how
//! they bind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Negate,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "not")]
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Remainder,
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Equals => "=",
            BinaryOp::NotEquals => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::And => " AND ",
            BinaryOp::Or => " OR ",
        }
    }
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "NOT ",
        }
    }
}

/// Expression as written in the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Bare identifier, matched case-insensitively
    Column(String),
    /// Double-quoted identifier, matched exactly
    Quoted(String),
    /// `table.column`
    Qualified { table: String, column: String },
    /// `*` in a select list
    Star,
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn quoted(name: impl Into<String>) -> Self {
        Expr::Quoted(name.into())
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Expr::Qualified {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn int(value: i64) -> Self {
        Expr::Int(value)
    }

    pub fn paren(inner: Expr) -> Self {
        Expr::Paren(Box::new(inner))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Equals, lhs, rhs)
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::And, lhs, rhs)
    }

    /// Strips any number of enclosing parentheses.
    pub fn unwrap_parens(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren(inner) = expr {
            expr = inner;
        }
        expr
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Quoted(name) => write!(f, "\"{}\"", name),
            Expr::Qualified { table, column } => write!(f, "{}.{}", table, column),
            Expr::Star => write!(f, "*"),
            Expr::Int(v) => write!(f, "{}", v),
            Expr::Float(v) => write!(f, "{}", v),
            Expr::String(s) => write!(f, "'{}'", s),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Null => write!(f, "NULL"),
            Expr::Paren(inner) => write!(f, "({})", inner),
            Expr::Unary { op, operand } => write!(f, "{}{}", op.symbol(), Operand(operand)),
            Expr::Binary { op, lhs, rhs } => {
                write!(f, "{}{}{}", Operand(lhs), op.symbol(), Operand(rhs))
            }
        }
    }
}

/// Renders a nested binary expression inside parentheses.
struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Expr::Binary { .. } => write!(f, "({})", self.0),
            expr => write!(f, "{}", expr),
        }
    }
}

/// Table in the FROM clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

/// One entry of the select list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectTarget {
    pub expr: Expr,
    #[serde(default)]
    pub alias: Option<String>,
}

/// One ORDER BY term. Direction defaults to ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub expr: Expr,
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl OrderBy {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            direction: None,
        }
    }

    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Some(Direction::Ascending),
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Some(Direction::Descending),
        }
    }
}

/// A single-table SELECT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    #[serde(default)]
    pub from: Option<TableRef>,
    pub targets: Vec<SelectTarget>,
    #[serde(default)]
    pub filter: Option<Expr>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
}

impl SelectStatement {
    pub fn from_table(name: impl Into<String>) -> Self {
        Self {
            from: Some(TableRef {
                name: name.into(),
                alias: None,
            }),
            targets: Vec::new(),
            filter: None,
            order_by: Vec::new(),
        }
    }

    /// Sets an alias on the FROM table.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let Some(from) = self.from.as_mut() {
            from.alias = Some(alias.into());
        }
        self
    }

    pub fn select(mut self, expr: Expr) -> Self {
        self.targets.push(SelectTarget { expr, alias: None });
        self
    }

    pub fn select_as(mut self, expr: Expr, alias: impl Into<String>) -> Self {
        self.targets.push(SelectTarget {
            expr,
            alias: Some(alias.into()),
        });
        self
    }

    /// Selects plain columns by name.
    pub fn columns<'n>(mut self, names: impl IntoIterator<Item = &'n str>) -> Self {
        for name in names {
            self = self.select(Expr::col(name));
        }
        self
    }

    pub fn filter(mut self, expr: Expr) -> Self {
        self.filter = Some(expr);
        self
    }

    pub fn order_by(mut self, term: OrderBy) -> Self {
        self.order_by.push(term);
        self
    }
}
