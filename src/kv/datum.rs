//! Scalar values and their total ordering
//!
//! Ordering is deterministic across types: Null < Bool < numbers < String.
//! Int and Float compare by exact value, with the Int first when the values
//! are equal. Floats use `total_cmp`, so NaN has a fixed place instead of
//! breaking sorts.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{ColumnType, Direction};

/// A single SQL value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Returns true if the value can be stored in a column of `column_type`.
    /// NULL fits every type.
    pub fn fits(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (Datum::Null, _)
                | (Datum::Bool(_), ColumnType::Bool)
                | (Datum::Int(_), ColumnType::Int)
                | (Datum::Float(_), ColumnType::Float)
                | (Datum::Int(_), ColumnType::Float)
                | (Datum::String(_), ColumnType::String)
        )
    }

    fn rank(&self) -> u8 {
        match self {
            Datum::Null => 0,
            Datum::Bool(_) => 1,
            Datum::Int(_) => 2,
            Datum::Float(_) => 3,
            Datum::String(_) => 4,
        }
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Datum {}

impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Datum {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Datum::Null, Datum::Null) => Ordering::Equal,
            (Datum::Bool(a), Datum::Bool(b)) => a.cmp(b),
            (Datum::Int(a), Datum::Int(b)) => a.cmp(b),
            (Datum::Float(a), Datum::Float(b)) => a.total_cmp(b),
            (Datum::String(a), Datum::String(b)) => a.cmp(b),
            (Datum::Int(a), Datum::Float(b)) => cmp_int_float(*a, *b).then(Ordering::Less),
            (Datum::Float(a), Datum::Int(b)) => cmp_int_float(*b, *a).reverse().then(Ordering::Greater),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

// Exact comparison; `as f64` would merge distinct integers above 2^53.
fn cmp_int_float(int: i64, float: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= TWO_POW_63 {
        return Ordering::Less;
    }
    if float < -TWO_POW_63 {
        return Ordering::Greater;
    }

    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&float).unwrap_or(Ordering::Equal),
        other => other,
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "NULL"),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Int(i) => write!(f, "{}", i),
            Datum::Float(v) => write!(f, "{}", v),
            Datum::String(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Int(v)
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Bool(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Float(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::String(v.to_string())
    }
}

/// One component of an encoded index key.
///
/// Descending components invert the datum ordering so that a forward walk of
/// the store yields the index's declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    Asc(Datum),
    Desc(Datum),
}

impl KeyPart {
    pub fn new(datum: Datum, direction: Direction) -> Self {
        match direction {
            Direction::Ascending => KeyPart::Asc(datum),
            Direction::Descending => KeyPart::Desc(datum),
        }
    }

    pub fn datum(&self) -> &Datum {
        match self {
            KeyPart::Asc(d) | KeyPart::Desc(d) => d,
        }
    }
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyPart::Asc(a), KeyPart::Asc(b)) => a.cmp(b),
            (KeyPart::Desc(a), KeyPart::Desc(b)) => b.cmp(a),
            (KeyPart::Asc(_), KeyPart::Desc(_)) => Ordering::Less,
            (KeyPart::Desc(_), KeyPart::Asc(_)) => Ordering::Greater,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_type_ordering() {
        let values = vec![
            Datum::Null,
            Datum::Bool(false),
            Datum::Bool(true),
            Datum::Float(f64::NEG_INFINITY),
            Datum::Int(-100),
            Datum::Float(-1.5),
            Datum::Int(0),
            Datum::Float(0.0),
            Datum::Float(2.5),
            Datum::Int(100),
            Datum::Float(f64::INFINITY),
            Datum::Float(f64::NAN),
            Datum::from("aaa"),
            Datum::from("zzz"),
        ];

        for i in 1..values.len() {
            assert!(values[i - 1] < values[i], "{} < {}", values[i - 1], values[i]);
        }
    }

    #[test]
    fn test_int_float_compare_by_value() {
        assert!(Datum::Float(-1.5) < Datum::Int(100));
        assert!(Datum::Int(100) > Datum::Float(-1.5));
        assert!(Datum::Float(99.5) < Datum::Int(100));
        assert!(Datum::Float(100.5) > Datum::Int(100));
        assert!(Datum::Int(-2) < Datum::Float(-1.5));

        // Equal values stay distinct, Int first
        assert_eq!(Datum::Int(2).cmp(&Datum::Float(2.0)), Ordering::Less);
        assert_eq!(Datum::Float(2.0).cmp(&Datum::Int(2)), Ordering::Greater);

        // Beyond 2^53 the integer is not rounded to the float
        let big = 1i64 << 53;
        assert!(Datum::Int(big + 1) > Datum::Float(big as f64));
        assert!(Datum::Int(i64::MAX) < Datum::Float(9.3e18));
        assert!(Datum::Int(i64::MIN) > Datum::Float(-9.3e18));
    }

    #[test]
    fn test_descending_key_part_inverts() {
        let low = KeyPart::new(Datum::Int(1), Direction::Descending);
        let high = KeyPart::new(Datum::Int(2), Direction::Descending);
        assert!(high < low);

        let low = KeyPart::new(Datum::Int(1), Direction::Ascending);
        let high = KeyPart::new(Datum::Int(2), Direction::Ascending);
        assert!(low < high);
    }

    #[test]
    fn test_display() {
        assert_eq!(Datum::Null.to_string(), "NULL");
        assert_eq!(Datum::Int(7).to_string(), "7");
        assert_eq!(Datum::from("x").to_string(), "'x'");
        assert_eq!(Datum::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_deserialize_untagged() {
        let row: Vec<Datum> = serde_json::from_str(r#"[1, 2.5, "s", true, null]"#).unwrap();
        assert_eq!(
            row,
            vec![
                Datum::Int(1),
                Datum::Float(2.5),
                Datum::from("s"),
                Datum::Bool(true),
                Datum::Null
            ]
        );
    }

    #[test]
    fn test_fits_column_type() {
        assert!(Datum::Int(1).fits(ColumnType::Int));
        assert!(Datum::Int(1).fits(ColumnType::Float));
        assert!(Datum::Null.fits(ColumnType::String));
        assert!(!Datum::from("a").fits(ColumnType::Int));
    }
}
