//! Selection operator.

use super::error::ExecuteResult;
use super::operator::{Lookahead, Operator, PullOperator};
use super::predicate::Predicate;
use crate::tuple::{Row, SchemaRef};

/// Filter operator - passes through child rows satisfying a predicate.
pub struct Filter {
    predicate: Predicate,
    child: Box<dyn Operator>,
    lookahead: Lookahead,
}

impl Filter {
    /// Create a filter over `child`, checking the predicate against its schema.
    pub fn new(predicate: Predicate, child: Box<dyn Operator>) -> ExecuteResult<Self> {
        predicate.validate(&child.schema())?;
        Ok(Self {
            predicate,
            child,
            lookahead: Lookahead::new(),
        })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl PullOperator for Filter {
    fn output_schema(&self) -> SchemaRef {
        self.child.schema()
    }

    fn lookahead(&mut self) -> &mut Lookahead {
        &mut self.lookahead
    }

    fn on_open(&mut self) -> ExecuteResult<()> {
        self.child.open()
    }

    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>> {
        while self.child.has_next()? {
            let row = self.child.next()?;
            if self.predicate.eval(&row)? {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn on_rewind(&mut self) -> ExecuteResult<()> {
        self.child.rewind()
    }

    fn on_close(&mut self) {
        self.child.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::{Field, Op};
    use crate::testutil::{drain_ints, int_scan};

    #[test]
    fn test_filter_keeps_matching_rows() {
        let scan = int_scan(&[&[1, 10], &[5, 50], &[3, 30], &[7, 70]]);
        let mut filter =
            Filter::new(Predicate::new(0, Op::GreaterThan, 2), Box::new(scan)).unwrap();

        filter.open().unwrap();
        assert_eq!(
            drain_ints(&mut filter),
            vec![vec![5, 50], vec![3, 30], vec![7, 70]]
        );

        filter.rewind().unwrap();
        assert_eq!(drain_ints(&mut filter).len(), 3);
        filter.close();
    }

    #[test]
    fn test_filter_output_is_subsequence() {
        let input: Vec<Vec<i32>> = (0..40).map(|i| vec![i % 7, i]).collect();
        let refs: Vec<&[i32]> = input.iter().map(Vec::as_slice).collect();

        for op in Op::ALL {
            if op == Op::Like {
                continue;
            }
            let mut filter =
                Filter::new(Predicate::new(0, op, 3), Box::new(int_scan(&refs))).unwrap();
            filter.open().unwrap();
            let output = drain_ints(&mut filter);

            let expected: Vec<Vec<i32>> = input
                .iter()
                .filter(|r| Field::Int(r[0]).compare(op, &Field::Int(3)))
                .cloned()
                .collect();
            assert_eq!(output, expected, "operator {}", op);
        }
    }

    #[test]
    fn test_filter_rejects_bad_predicate() {
        let scan = int_scan(&[&[1]]);
        let err = Filter::new(Predicate::new(0, Op::Equals, "x"), Box::new(scan))
            .err()
            .unwrap();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_filter_empty_child() {
        let mut filter =
            Filter::new(Predicate::new(0, Op::Equals, 1), Box::new(int_scan(&[]))).unwrap();
        filter.open().unwrap();
        assert!(!filter.has_next().unwrap());
    }
}
