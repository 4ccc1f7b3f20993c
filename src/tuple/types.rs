//! Column types, field values and comparison operators.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of bytes stored for a text value.
pub const MAX_TEXT_LEN: usize = 128;

/// Column kinds supported by the row model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// 32-bit signed integer.
    Int,
    /// Bounded-length text.
    Text,
}

impl Type {
    /// Encoded length of a value of this type, in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Type::Int => 4,
            // Length prefix followed by the padded payload.
            Type::Text => 4 + MAX_TEXT_LEN,
        }
    }

    /// Get the SQL name for this type.
    pub fn sql_name(&self) -> &'static str {
        match self {
            Type::Int => "INT",
            Type::Text => "TEXT",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

/// Comparison operators used by predicates and selectivity estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Equals,
    GreaterThan,
    LessThan,
    LessThanOrEq,
    GreaterThanOrEq,
    Like,
    NotEquals,
}

impl Op {
    /// All operators, in declaration order.
    pub const ALL: [Op; 7] = [
        Op::Equals,
        Op::GreaterThan,
        Op::LessThan,
        Op::LessThanOrEq,
        Op::GreaterThanOrEq,
        Op::Like,
        Op::NotEquals,
    ];

    /// Symbol used when printing predicates.
    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Equals => "=",
            Op::GreaterThan => ">",
            Op::LessThan => "<",
            Op::LessThanOrEq => "<=",
            Op::GreaterThanOrEq => ">=",
            Op::Like => "LIKE",
            Op::NotEquals => "<>",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A typed, immutable column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Int(i32),
    Text(String),
}

impl Field {
    /// Create a text field, truncating to [`MAX_TEXT_LEN`] bytes.
    pub fn text(value: impl Into<String>) -> Self {
        let mut s = value.into();
        if s.len() > MAX_TEXT_LEN {
            let mut cut = MAX_TEXT_LEN;
            while !s.is_char_boundary(cut) {
                cut -= 1;
            }
            s.truncate(cut);
        }
        Field::Text(s)
    }

    /// The column type of this value.
    pub fn field_type(&self) -> Type {
        match self {
            Field::Int(_) => Type::Int,
            Field::Text(_) => Type::Text,
        }
    }

    /// Integer payload, if this is an integer field.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Field::Int(v) => Some(*v),
            Field::Text(_) => None,
        }
    }

    /// Text payload, if this is a text field.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s),
            Field::Int(_) => None,
        }
    }

    /// Evaluate `self op other`.
    ///
    /// Values of different types never satisfy any operator. `LIKE` is
    /// substring containment for text and plain equality for integers.
    pub fn compare(&self, op: Op, other: &Field) -> bool {
        match (self, other) {
            (Field::Int(a), Field::Int(b)) => match op {
                Op::Like => a == b,
                _ => ordering_satisfies(a.cmp(b), op),
            },
            (Field::Text(a), Field::Text(b)) => match op {
                Op::Like => a.contains(b.as_str()),
                _ => ordering_satisfies(a.cmp(b), op),
            },
            _ => false,
        }
    }
}

fn ordering_satisfies(ord: Ordering, op: Op) -> bool {
    match op {
        Op::Equals | Op::Like => ord == Ordering::Equal,
        Op::NotEquals => ord != Ordering::Equal,
        Op::GreaterThan => ord == Ordering::Greater,
        Op::GreaterThanOrEq => ord != Ordering::Less,
        Op::LessThan => ord == Ordering::Less,
        Op::LessThanOrEq => ord != Ordering::Greater,
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{}", v),
            Field::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Field {
    fn from(v: i32) -> Self {
        Field::Int(v)
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::text(s)
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Field::text(s)
    }
}
