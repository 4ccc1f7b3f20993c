//! Grouping and accumulation engine behind the Aggregate operator.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ExecuteError, ExecuteResult};
use crate::tuple::{ColumnDesc, Field, Row, Schema, SchemaRef, Type};

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl AggregateOp {
    /// Lowercase function name.
    pub fn name(&self) -> &'static str {
        match self {
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::Sum => "sum",
            AggregateOp::Avg => "avg",
            AggregateOp::Count => "count",
        }
    }

    /// Check if the function can be applied to columns of `field_type`.
    pub fn supports(&self, field_type: Type) -> bool {
        match field_type {
            Type::Int => true,
            Type::Text => *self == AggregateOp::Count,
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Running state for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Accumulator {
    Numeric {
        count: i64,
        sum: i64,
        min: i32,
        max: i32,
    },
    Textual {
        count: i64,
    },
}

impl Accumulator {
    fn new(field_type: Type) -> Self {
        match field_type {
            Type::Int => Accumulator::Numeric {
                count: 0,
                sum: 0,
                min: i32::MAX,
                max: i32::MIN,
            },
            Type::Text => Accumulator::Textual { count: 0 },
        }
    }

    fn merge(&mut self, value: &Field) {
        match (self, value) {
            (
                Accumulator::Numeric {
                    count,
                    sum,
                    min,
                    max,
                },
                Field::Int(v),
            ) => {
                *count += 1;
                *sum += i64::from(*v);
                *min = (*min).min(*v);
                *max = (*max).max(*v);
            }
            (Accumulator::Textual { count }, _) => *count += 1,
            // The aggregate column type is checked before merging.
            (Accumulator::Numeric { .. }, Field::Text(_)) => {}
        }
    }

    fn value(&self, op: AggregateOp) -> ExecuteResult<i32> {
        let wide = match (self, op) {
            // An implicit group that saw no rows reports 0 for every function.
            (Accumulator::Numeric { count: 0, .. }, _) => 0,
            (Accumulator::Numeric { min, .. }, AggregateOp::Min) => i64::from(*min),
            (Accumulator::Numeric { max, .. }, AggregateOp::Max) => i64::from(*max),
            (Accumulator::Numeric { sum, .. }, AggregateOp::Sum) => *sum,
            (Accumulator::Numeric { sum, count, .. }, AggregateOp::Avg) => sum / count,
            (Accumulator::Numeric { count, .. }, AggregateOp::Count)
            | (Accumulator::Textual { count }, AggregateOp::Count) => *count,
            (Accumulator::Textual { .. }, op) => {
                return Err(ExecuteError::UnsupportedAggregate {
                    op,
                    field_type: Type::Text,
                })
            }
        };
        i32::try_from(wide).map_err(|_| ExecuteError::Overflow(format!("{} = {}", op, wide)))
    }
}

/// Computes one aggregate over a set of rows, optionally grouped by a column.
///
/// Rows are merged one at a time in O(1); memory grows with the number of
/// distinct groups only. Results come out in the order groups were first seen.
/// Without grouping there is exactly one implicit group, so results always
/// hold one row, even for empty input.
#[derive(Debug, Clone)]
pub struct Aggregator {
    group_by: Option<(usize, Type)>,
    agg_field: usize,
    agg_type: Type,
    op: AggregateOp,
    groups: Vec<(Option<Field>, Accumulator)>,
    index: HashMap<Option<Field>, usize>,
}

impl Aggregator {
    /// Create an aggregator.
    ///
    /// `group_by` is the group column's index and type in input rows, or None
    /// for a single implicit group. Fails for any function other than COUNT on
    /// a text column.
    pub fn new(
        group_by: Option<(usize, Type)>,
        agg_field: usize,
        agg_type: Type,
        op: AggregateOp,
    ) -> ExecuteResult<Self> {
        if !op.supports(agg_type) {
            return Err(ExecuteError::UnsupportedAggregate {
                op,
                field_type: agg_type,
            });
        }
        let mut aggregator = Self {
            group_by,
            agg_field,
            agg_type,
            op,
            groups: Vec::new(),
            index: HashMap::new(),
        };
        aggregator.reset();
        Ok(aggregator)
    }

    /// Aggregate function.
    pub fn op(&self) -> AggregateOp {
        self.op
    }

    /// Number of groups seen so far, counting the implicit group.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Fold one input row into its group.
    pub fn merge_row(&mut self, row: &Row) -> ExecuteResult<()> {
        let key = match self.group_by {
            Some((i, _)) => Some(row.get(i)?.clone()),
            None => None,
        };
        let value = row.get(self.agg_field)?;
        if value.field_type() != self.agg_type {
            return Err(crate::tuple::SchemaError::TypeMismatch {
                index: self.agg_field,
                expected: self.agg_type,
                actual: value.field_type(),
            }
            .into());
        }

        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.groups.push((key.clone(), Accumulator::new(self.agg_type)));
                self.index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].1.merge(value);
        Ok(())
    }

    /// Schema of result rows, `(group, value)` or `(value)`.
    pub fn output_schema(&self, group_name: Option<&str>, agg_name: &str) -> Schema {
        let mut columns = Vec::with_capacity(2);
        if let Some((_, group_type)) = self.group_by {
            columns.push(ColumnDesc::new(group_name.unwrap_or_default(), group_type));
        }
        columns.push(ColumnDesc::new(
            format!("{}({})", self.op, agg_name),
            Type::Int,
        ));
        Schema::from_columns(columns)
    }

    /// One row per group, bound to `schema`.
    pub fn results(&self, schema: &SchemaRef) -> ExecuteResult<Vec<Row>> {
        self.groups
            .iter()
            .map(|(key, acc)| -> ExecuteResult<Row> {
                let mut fields = Vec::with_capacity(2);
                if let Some(key) = key {
                    fields.push(key.clone());
                }
                fields.push(Field::Int(acc.value(self.op)?));
                Ok(Row::from_fields(schema.clone(), fields)?)
            })
            .collect()
    }

    /// Drop every group. An ungrouped aggregator keeps its implicit group,
    /// emptied.
    pub fn reset(&mut self) {
        self.groups.clear();
        self.index.clear();
        if self.group_by.is_none() {
            self.groups.push((None, Accumulator::new(self.agg_type)));
            self.index.insert(None, 0);
        }
    }
}
