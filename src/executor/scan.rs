//! Leaf operators: in-memory row lists and sequential table scans.

use std::sync::Arc;

use super::error::ExecuteResult;
use super::operator::{Lookahead, PullOperator};
use crate::storage::{Catalog, DbFile, DbFileIterator, TransactionId};
use crate::tuple::{ColumnDesc, Row, Schema, SchemaRef, TableId};

/// Scan operator over an owned list of rows.
pub struct VecScan {
    schema: SchemaRef,
    rows: Vec<Row>,
    position: usize,
    lookahead: Lookahead,
}

impl VecScan {
    pub fn new(schema: SchemaRef, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows,
            position: 0,
            lookahead: Lookahead::new(),
        }
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no rows are held.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl PullOperator for VecScan {
    fn output_schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn lookahead(&mut self) -> &mut Lookahead {
        &mut self.lookahead
    }

    fn on_open(&mut self) -> ExecuteResult<()> {
        self.position = 0;
        Ok(())
    }

    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>> {
        if self.position < self.rows.len() {
            let row = self.rows[self.position].clone();
            self.position += 1;
            Ok(Some(row))
        } else {
            Ok(None)
        }
    }

    fn on_rewind(&mut self) -> ExecuteResult<()> {
        self.position = 0;
        Ok(())
    }

    fn on_close(&mut self) {
        self.position = 0;
    }
}

/// Sequential scan over a stored table, in page order.
///
/// Output columns are named `alias.column`; the alias defaults to the table
/// name.
pub struct SeqScan {
    tid: TransactionId,
    table: TableId,
    table_name: String,
    alias: String,
    file: Arc<dyn DbFile>,
    schema: SchemaRef,
    iter: Option<Box<dyn DbFileIterator>>,
    lookahead: Lookahead,
}

impl SeqScan {
    /// Resolve `table` through the catalog.
    pub fn new(
        tid: TransactionId,
        table: TableId,
        alias: Option<&str>,
        catalog: &dyn Catalog,
    ) -> ExecuteResult<Self> {
        let file = catalog.table_file(table)?;
        let table_name = catalog.table_name(table)?;
        let alias = alias.unwrap_or(&table_name).to_string();
        let columns = file
            .schema()
            .iter()
            .map(|c| ColumnDesc::new(format!("{}.{}", alias, c.name), c.field_type))
            .collect();

        Ok(Self {
            tid,
            table,
            table_name,
            alias,
            file,
            schema: Schema::from_columns(columns).into_ref(),
            iter: None,
            lookahead: Lookahead::new(),
        })
    }

    /// Id of the scanned table.
    pub fn table_id(&self) -> TableId {
        self.table
    }

    /// Name of the scanned table.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Alias used to prefix column names.
    pub fn alias(&self) -> &str {
        &self.alias
    }
}

impl PullOperator for SeqScan {
    fn output_schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn lookahead(&mut self) -> &mut Lookahead {
        &mut self.lookahead
    }

    fn on_open(&mut self) -> ExecuteResult<()> {
        let mut iter = self.file.clone().scan(self.tid);
        iter.open()?;
        self.iter = Some(iter);
        Ok(())
    }

    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>> {
        let Some(iter) = self.iter.as_mut() else {
            return Ok(None);
        };
        match iter.next_row()? {
            Some(mut row) => {
                row.rebind(self.schema.clone())?;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    fn on_rewind(&mut self) -> ExecuteResult<()> {
        if let Some(iter) = self.iter.as_mut() {
            iter.rewind()?;
        }
        Ok(())
    }

    fn on_close(&mut self) {
        if let Some(mut iter) = self.iter.take() {
            iter.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Operator;
    use crate::storage::{BufferPool, MemoryDatabase};
    use crate::testutil::{drain_ints, int_table};

    #[test]
    fn test_seq_scan_reads_all_pages() {
        let (db, table) = int_table("nums", &[&[1, 10], &[2, 20], &[3, 30]], 2);
        let mut scan = SeqScan::new(TransactionId::new(), table, None, &db).unwrap();

        assert_eq!(scan.table_name(), "nums");
        assert_eq!(scan.schema().field_name(0).unwrap(), "nums.c0");

        scan.open().unwrap();
        let rows = drain_ints(&mut scan);
        assert_eq!(rows, vec![vec![1, 10], vec![2, 20], vec![3, 30]]);

        scan.rewind().unwrap();
        assert_eq!(drain_ints(&mut scan).len(), 3);
        scan.close();
    }

    #[test]
    fn test_seq_scan_alias() {
        let (db, table) = int_table("nums", &[&[1, 10]], 4);
        let mut scan = SeqScan::new(TransactionId::new(), table, Some("n"), &db).unwrap();
        assert_eq!(scan.alias(), "n");
        assert_eq!(scan.schema().field_name(1).unwrap(), "n.c1");

        scan.open().unwrap();
        assert!(scan.has_next().unwrap());
        let row = scan.next().unwrap();
        assert_eq!(row.schema().field_name(0).unwrap(), "n.c0");
        assert!(row.record_id().is_some());
    }

    #[test]
    fn test_seq_scan_unknown_table() {
        let db = MemoryDatabase::new();
        let result = SeqScan::new(TransactionId::new(), TableId(42), None, &db);
        assert!(result.is_err());
    }

    #[test]
    fn test_seq_scan_propagates_abort() {
        let (db, table) = int_table("nums", &[&[1, 1], &[2, 2]], 1);
        let tid = TransactionId::new();
        let mut scan = SeqScan::new(tid, table, None, &db).unwrap();
        scan.open().unwrap();
        assert!(scan.has_next().unwrap());
        scan.next().unwrap();

        db.abort(tid);
        let err = scan.has_next().unwrap_err();
        assert!(err.is_abort());
        scan.close();

        // The aborted transaction cannot write either.
        let row = Row::new(db.table(table).unwrap().schema());
        assert!(db.insert_row(tid, table, row).is_err());
    }
}
