//! Nested-loop join.

use tracing::trace;

use super::error::ExecuteResult;
use super::operator::{Lookahead, Operator, PullOperator};
use super::predicate::JoinPredicate;
use crate::tuple::{Row, Schema, SchemaRef};

/// Join operator - emits `left ++ right` for every pair satisfying the
/// predicate.
///
/// Output order is left-major: all matches for the first left row (in right
/// order), then all matches for the second, and so on. The right child is
/// rewound once per left row.
pub struct Join {
    predicate: JoinPredicate,
    left: Box<dyn Operator>,
    right: Box<dyn Operator>,
    schema: SchemaRef,
    current_left: Option<Row>,
    lookahead: Lookahead,
}

impl Join {
    pub fn new(
        predicate: JoinPredicate,
        left: Box<dyn Operator>,
        right: Box<dyn Operator>,
    ) -> ExecuteResult<Self> {
        let left_schema = left.schema();
        let right_schema = right.schema();
        predicate.validate(&left_schema, &right_schema)?;

        Ok(Self {
            predicate,
            schema: Schema::merge(&left_schema, &right_schema).into_ref(),
            left,
            right,
            current_left: None,
            lookahead: Lookahead::new(),
        })
    }

    pub fn predicate(&self) -> &JoinPredicate {
        &self.predicate
    }

    /// Name of the compared column on the left side.
    pub fn left_field_name(&self) -> String {
        self.left
            .schema()
            .field_name(self.predicate.left_field())
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Name of the compared column on the right side.
    pub fn right_field_name(&self) -> String {
        self.right
            .schema()
            .field_name(self.predicate.right_field())
            .map(str::to_string)
            .unwrap_or_default()
    }
}

impl PullOperator for Join {
    fn output_schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn lookahead(&mut self) -> &mut Lookahead {
        &mut self.lookahead
    }

    fn on_open(&mut self) -> ExecuteResult<()> {
        self.current_left = None;
        self.left.open()?;
        self.right.open()
    }

    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>> {
        loop {
            if self.current_left.is_none() {
                if !self.left.has_next()? {
                    return Ok(None);
                }
                self.current_left = Some(self.left.next()?);
            }
            let Some(left) = self.current_left.as_ref() else {
                continue;
            };

            while self.right.has_next()? {
                let right = self.right.next()?;
                if self.predicate.eval(left, &right)? {
                    return Ok(Some(Row::concat(self.schema.clone(), left, &right)));
                }
            }

            trace!(predicate = %self.predicate, "right side exhausted, advancing left");
            self.current_left = None;
            self.right.rewind()?;
        }
    }

    fn on_rewind(&mut self) -> ExecuteResult<()> {
        self.current_left = None;
        self.left.rewind()?;
        self.right.rewind()
    }

    fn on_close(&mut self) {
        self.current_left = None;
        self.left.close();
        self.right.close();
    }
}
