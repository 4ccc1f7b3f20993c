//! Blocking aggregation operator.

use tracing::debug;

use super::aggregator::{AggregateOp, Aggregator};
use super::error::ExecuteResult;
use super::operator::{Lookahead, Operator, PullOperator};
use crate::tuple::{Row, SchemaRef};

/// Aggregate operator - computes one aggregate, optionally grouped by a
/// single column.
///
/// `open` drains the whole child into an [`Aggregator`] before the first row
/// is produced. `rewind` replays the computed groups without touching the
/// child again.
pub struct Aggregate {
    child: Box<dyn Operator>,
    agg_field: usize,
    group_field: Option<usize>,
    aggregator: Aggregator,
    schema: SchemaRef,
    results: Vec<Row>,
    position: usize,
    lookahead: Lookahead,
}

impl Aggregate {
    pub fn new(
        child: Box<dyn Operator>,
        agg_field: usize,
        group_field: Option<usize>,
        op: AggregateOp,
    ) -> ExecuteResult<Self> {
        let child_schema = child.schema();
        let agg_type = child_schema.field_type(agg_field)?;
        let group_by = match group_field {
            Some(i) => Some((i, child_schema.field_type(i)?)),
            None => None,
        };
        let aggregator = Aggregator::new(group_by, agg_field, agg_type, op)?;

        let group_name = match group_field {
            Some(i) => Some(child_schema.field_name(i)?),
            None => None,
        };
        let schema = aggregator
            .output_schema(group_name, child_schema.field_name(agg_field)?)
            .into_ref();

        Ok(Self {
            child,
            agg_field,
            group_field,
            aggregator,
            schema,
            results: Vec::new(),
            position: 0,
            lookahead: Lookahead::new(),
        })
    }

    /// Index of the group-by column in child rows, if grouping.
    pub fn group_field(&self) -> Option<usize> {
        self.group_field
    }

    /// Name of the group-by column, if grouping.
    pub fn group_field_name(&self) -> Option<String> {
        let i = self.group_field?;
        self.child.schema().field_name(i).ok().map(str::to_string)
    }

    /// Index of the aggregated column in child rows.
    pub fn aggregate_field(&self) -> usize {
        self.agg_field
    }

    /// Name of the aggregated column.
    pub fn aggregate_field_name(&self) -> String {
        self.child
            .schema()
            .field_name(self.agg_field)
            .map(str::to_string)
            .unwrap_or_default()
    }

    pub fn aggregate_op(&self) -> AggregateOp {
        self.aggregator.op()
    }
}

impl PullOperator for Aggregate {
    fn output_schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn lookahead(&mut self) -> &mut Lookahead {
        &mut self.lookahead
    }

    fn on_open(&mut self) -> ExecuteResult<()> {
        self.child.open()?;
        self.aggregator.reset();

        let mut input_rows = 0usize;
        while self.child.has_next()? {
            let row = self.child.next()?;
            self.aggregator.merge_row(&row)?;
            input_rows += 1;
        }
        self.results = self.aggregator.results(&self.schema)?;
        self.position = 0;

        debug!(
            op = %self.aggregator.op(),
            input_rows,
            groups = self.results.len(),
            "aggregate input drained"
        );
        Ok(())
    }

    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>> {
        let row = self.results.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    fn on_rewind(&mut self) -> ExecuteResult<()> {
        self.position = 0;
        Ok(())
    }

    fn on_close(&mut self) {
        self.child.close();
        self.results.clear();
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::error::ExecuteError;
    use crate::executor::{SeqScan, VecScan};
    use crate::storage::TransactionId;
    use crate::testutil::{drain_ints, int_scan, int_table, Tracked};
    use crate::tuple::{Field, SchemaBuilder, Type};

    #[test]
    fn test_grouped_count() {
        let scan = int_scan(&[&[1, 10], &[2, 20], &[1, 30], &[2, 40], &[1, 50]]);
        let mut agg = Aggregate::new(Box::new(scan), 1, Some(0), AggregateOp::Count).unwrap();

        agg.open().unwrap();
        let mut rows = drain_ints(&mut agg);
        rows.sort();
        assert_eq!(rows, vec![vec![1, 3], vec![2, 2]]);

        let total: i32 = rows.iter().map(|r| r[1]).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_rewind_replays_without_redrain() {
        let scan = int_scan(&[&[1, 10], &[1, 20], &[2, 5]]);
        let mut agg = Aggregate::new(Box::new(scan), 1, Some(0), AggregateOp::Sum).unwrap();

        agg.open().unwrap();
        let first = drain_ints(&mut agg);
        agg.rewind().unwrap();
        let second = drain_ints(&mut agg);
        assert_eq!(first, vec![vec![1, 30], vec![2, 5]]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reopen_resets_groups() {
        let scan = int_scan(&[&[7, 1], &[7, 2]]);
        let mut agg = Aggregate::new(Box::new(scan), 1, None, AggregateOp::Count).unwrap();

        agg.open().unwrap();
        assert_eq!(drain_ints(&mut agg), vec![vec![2]]);
        agg.close();
        agg.open().unwrap();
        assert_eq!(drain_ints(&mut agg), vec![vec![2]]);
    }

    #[test]
    fn test_avg_truncating() {
        let scan = int_scan(&[&[1], &[2]]);
        let mut agg = Aggregate::new(Box::new(scan), 0, None, AggregateOp::Avg).unwrap();
        agg.open().unwrap();
        assert_eq!(drain_ints(&mut agg), vec![vec![1]]);
    }

    #[test]
    fn test_empty_input_without_grouping() {
        let mut agg =
            Aggregate::new(Box::new(int_scan(&[])), 0, None, AggregateOp::Count).unwrap();
        agg.open().unwrap();
        assert_eq!(drain_ints(&mut agg), vec![vec![0]]);

        let mut agg = Aggregate::new(Box::new(int_scan(&[])), 0, None, AggregateOp::Max).unwrap();
        agg.open().unwrap();
        assert_eq!(drain_ints(&mut agg), vec![vec![0]]);
    }

    #[test]
    fn test_empty_input_with_grouping() {
        let scan = int_scan(&[]);
        let mut agg = Aggregate::new(Box::new(scan), 0, Some(0), AggregateOp::Count).unwrap();
        agg.open().unwrap();
        assert!(!agg.has_next().unwrap());
    }

    #[test]
    fn test_abort_while_draining_closes_child() {
        let (db, table) = int_table("t", &[&[1, 1], &[2, 2]], 1);
        let tid = TransactionId::new();
        let scan = SeqScan::new(tid, table, None, &db).unwrap();
        let (child, lifecycle) = Tracked::new(scan);
        let mut agg = Aggregate::new(Box::new(child), 1, None, AggregateOp::Sum).unwrap();

        db.abort(tid);
        let err = agg.open().unwrap_err();
        assert!(err.is_abort());
        assert!(!lifecycle.is_open());
        assert!(lifecycle.closes() >= 1);
        assert!(agg.has_next().unwrap_err().is_iteration_error());
    }

    #[test]
    fn test_text_column() {
        let schema = SchemaBuilder::new().text("name").int("age").build().into_ref();
        let rows = ["ann", "bob", "cat"]
            .iter()
            .map(|n| Row::from_fields(schema.clone(), vec![Field::text(*n), Field::Int(1)]))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let scan = VecScan::new(schema.clone(), rows.clone());
        let mut count = Aggregate::new(Box::new(scan), 0, None, AggregateOp::Count).unwrap();
        assert_eq!(count.schema().field_type(0).unwrap(), Type::Int);
        assert_eq!(count.schema().field_name(0).unwrap(), "count(name)");
        count.open().unwrap();
        assert_eq!(drain_ints(&mut count), vec![vec![3]]);

        let scan = VecScan::new(schema, rows);
        let err = Aggregate::new(Box::new(scan), 0, None, AggregateOp::Sum)
            .err()
            .unwrap();
        assert!(matches!(err, ExecuteError::UnsupportedAggregate { .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_accessors() {
        let schema = SchemaBuilder::new().text("region").int("price").build().into_ref();
        let scan = VecScan::new(schema, vec![]);
        let agg = Aggregate::new(Box::new(scan), 1, Some(0), AggregateOp::Max).unwrap();

        assert_eq!(agg.group_field(), Some(0));
        assert_eq!(agg.group_field_name().as_deref(), Some("region"));
        assert_eq!(agg.aggregate_field(), 1);
        assert_eq!(agg.aggregate_field_name(), "price");
        assert_eq!(agg.aggregate_op(), AggregateOp::Max);
        assert_eq!(agg.schema().to_string(), "TEXT(region), INT(max(price))");
    }
}
