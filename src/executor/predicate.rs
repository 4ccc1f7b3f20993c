//! Selection and join predicates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ExecuteResult;
use crate::tuple::{Field, Op, Row, Schema, SchemaError, SchemaResult};

/// `row[field] op operand`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    field: usize,
    op: Op,
    operand: Field,
}

impl Predicate {
    /// Create a new predicate.
    pub fn new(field: usize, op: Op, operand: impl Into<Field>) -> Self {
        Self {
            field,
            op,
            operand: operand.into(),
        }
    }

    /// Index of the tested column.
    pub fn field(&self) -> usize {
        self.field
    }

    /// Comparison operator.
    pub fn op(&self) -> Op {
        self.op
    }

    /// Constant compared against.
    pub fn operand(&self) -> &Field {
        &self.operand
    }

    /// Check that the predicate can be applied to rows of `schema`.
    pub fn validate(&self, schema: &Schema) -> SchemaResult<()> {
        schema.check_field(self.field, &self.operand)
    }

    /// Evaluate against `row`.
    pub fn eval(&self, row: &Row) -> ExecuteResult<bool> {
        Ok(row.get(self.field)?.compare(self.op, &self.operand))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} {} {}", self.field, self.op, self.operand)
    }
}

/// `left[left_field] op right[right_field]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPredicate {
    left_field: usize,
    op: Op,
    right_field: usize,
}

impl JoinPredicate {
    /// Create a new join predicate.
    pub fn new(left_field: usize, op: Op, right_field: usize) -> Self {
        Self {
            left_field,
            op,
            right_field,
        }
    }

    /// Index of the compared column in left rows.
    pub fn left_field(&self) -> usize {
        self.left_field
    }

    /// Index of the compared column in right rows.
    pub fn right_field(&self) -> usize {
        self.right_field
    }

    /// Comparison operator.
    pub fn op(&self) -> Op {
        self.op
    }

    /// Check that both columns exist and have the same type.
    pub fn validate(&self, left: &Schema, right: &Schema) -> SchemaResult<()> {
        let expected = left.field_type(self.left_field)?;
        let actual = right.field_type(self.right_field)?;
        if expected != actual {
            return Err(SchemaError::TypeMismatch {
                index: self.right_field,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Evaluate against a pair of rows.
    pub fn eval(&self, left: &Row, right: &Row) -> ExecuteResult<bool> {
        let l = left.get(self.left_field)?;
        let r = right.get(self.right_field)?;
        Ok(l.compare(self.op, r))
    }
}

impl fmt::Display for JoinPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l${} {} r${}", self.left_field, self.op, self.right_field)
    }
}
