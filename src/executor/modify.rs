//! Data modification operators.
//!
//! Both drain their child on the first pull and report how many rows they
//! touched as a single one-column integer row.

use std::sync::Arc;

use tracing::debug;

use super::error::{ExecuteError, ExecuteResult};
use super::operator::{Lookahead, Operator, PullOperator};
use crate::storage::{BufferPool, Catalog, TransactionId};
use crate::tuple::{Field, Row, SchemaBuilder, SchemaRef, TableId};

fn count_schema() -> SchemaRef {
    SchemaBuilder::new().int("count").build().into_ref()
}

fn count_row(schema: &SchemaRef, count: usize) -> ExecuteResult<Row> {
    let count = i32::try_from(count)
        .map_err(|_| ExecuteError::Overflow(format!("affected rows = {}", count)))?;
    Ok(Row::from_fields(schema.clone(), vec![Field::Int(count)])?)
}

/// Insert operator - writes every child row into a table.
pub struct Insert {
    tid: TransactionId,
    child: Box<dyn Operator>,
    table: TableId,
    pool: Arc<dyn BufferPool>,
    schema: SchemaRef,
    done: bool,
    lookahead: Lookahead,
}

impl Insert {
    /// Fails unless the child's schema matches the table's.
    pub fn new(
        tid: TransactionId,
        child: Box<dyn Operator>,
        table: TableId,
        catalog: &dyn Catalog,
        pool: Arc<dyn BufferPool>,
    ) -> ExecuteResult<Self> {
        let expected = catalog.schema(table)?;
        let actual = child.schema();
        if *expected != *actual {
            return Err(ExecuteError::SchemaMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(Self {
            tid,
            child,
            table,
            pool,
            schema: count_schema(),
            done: false,
            lookahead: Lookahead::new(),
        })
    }

    /// Target table.
    pub fn table_id(&self) -> TableId {
        self.table
    }
}

impl PullOperator for Insert {
    fn output_schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn lookahead(&mut self) -> &mut Lookahead {
        &mut self.lookahead
    }

    fn on_open(&mut self) -> ExecuteResult<()> {
        self.done = false;
        self.child.open()
    }

    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>> {
        if self.done {
            return Ok(None);
        }
        let mut inserted = 0usize;
        while self.child.has_next()? {
            let row = self.child.next()?;
            self.pool.insert_row(self.tid, self.table, row)?;
            inserted += 1;
        }
        self.done = true;
        debug!(table = %self.table, inserted, "insert finished");
        count_row(&self.schema, inserted).map(Some)
    }

    fn on_rewind(&mut self) -> ExecuteResult<()> {
        self.done = false;
        self.child.rewind()
    }

    fn on_close(&mut self) {
        self.child.close();
    }
}

/// Delete operator - removes every child row from storage.
///
/// Child rows must carry the record id they were read under.
pub struct Delete {
    tid: TransactionId,
    child: Box<dyn Operator>,
    pool: Arc<dyn BufferPool>,
    schema: SchemaRef,
    done: bool,
    lookahead: Lookahead,
}

impl Delete {
    pub fn new(tid: TransactionId, child: Box<dyn Operator>, pool: Arc<dyn BufferPool>) -> Self {
        Self {
            tid,
            child,
            pool,
            schema: count_schema(),
            done: false,
            lookahead: Lookahead::new(),
        }
    }
}

impl PullOperator for Delete {
    fn output_schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn lookahead(&mut self) -> &mut Lookahead {
        &mut self.lookahead
    }

    fn on_open(&mut self) -> ExecuteResult<()> {
        self.done = false;
        self.child.open()
    }

    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>> {
        if self.done {
            return Ok(None);
        }
        let mut deleted = 0usize;
        while self.child.has_next()? {
            let row = self.child.next()?;
            self.pool.delete_row(self.tid, &row)?;
            deleted += 1;
        }
        self.done = true;
        debug!(deleted, "delete finished");
        count_row(&self.schema, deleted).map(Some)
    }

    fn on_rewind(&mut self) -> ExecuteResult<()> {
        self.done = false;
        self.child.rewind()
    }

    fn on_close(&mut self) {
        self.child.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Filter, Predicate, SeqScan};
    use crate::storage::MemoryDatabase;
    use crate::testutil::{drain_ints, int_scan, int_table};
    use crate::tuple::Op;

    #[test]
    fn test_insert_reports_count() {
        let (db, table) = int_table("t", &[], 2);
        let tid = TransactionId::new();
        let source = int_scan(&[&[1, 2], &[3, 4], &[5, 6]]);
        let mut insert =
            Insert::new(tid, Box::new(source), table, &db, Arc::new(db.clone())).unwrap();

        insert.open().unwrap();
        assert_eq!(drain_ints(&mut insert), vec![vec![3]]);
        assert!(!insert.has_next().unwrap());
        insert.close();

        let mut scan = SeqScan::new(tid, table, None, &db).unwrap();
        scan.open().unwrap();
        assert_eq!(drain_ints(&mut scan), vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    }

    #[test]
    fn test_insert_schema_mismatch() {
        let (db, table) = int_table("t", &[], 2);
        let source = int_scan(&[&[1]]);
        let pool: Arc<dyn BufferPool> = Arc::new(db.clone());
        let err = Insert::new(TransactionId::new(), Box::new(source), table, &db, pool)
            .err()
            .unwrap();
        assert!(matches!(err, ExecuteError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_delete_matching_rows() {
        let (db, table) = int_table("t", &[&[1, 0], &[2, 0], &[3, 0], &[4, 0]], 2);
        let tid = TransactionId::new();
        let scan = SeqScan::new(tid, table, None, &db).unwrap();
        let filter = Filter::new(Predicate::new(0, Op::GreaterThanOrEq, 3), Box::new(scan)).unwrap();
        let mut delete = Delete::new(tid, Box::new(filter), Arc::new(db.clone()));

        delete.open().unwrap();
        assert_eq!(drain_ints(&mut delete), vec![vec![2]]);
        delete.close();

        let mut scan = SeqScan::new(tid, table, None, &db).unwrap();
        scan.open().unwrap();
        assert_eq!(drain_ints(&mut scan), vec![vec![1, 0], vec![2, 0]]);
    }

    #[test]
    fn test_delete_needs_record_ids() {
        let db = MemoryDatabase::new();
        let mut delete = Delete::new(
            TransactionId::new(),
            Box::new(int_scan(&[&[1]])),
            Arc::new(db),
        );
        delete.open().unwrap();
        assert!(delete.has_next().is_err());
    }
}
