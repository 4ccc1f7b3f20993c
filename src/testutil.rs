//! Helpers shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::executor::{ExecuteResult, Lookahead, Operator, PullOperator, VecScan};
use crate::storage::{BufferPool, MemoryDatabase, TransactionId};
use crate::tuple::{Field, Row, Schema, SchemaError, SchemaRef, TableId, Type};

/// Schema of `width` integer columns named `c0`, `c1`, ...
pub fn int_schema(width: usize) -> Schema {
    let names: Vec<String> = (0..width).map(|i| format!("c{}", i)).collect();
    Schema::new(vec![Type::Int; width], names).unwrap()
}

/// Rows of integers bound to `schema`.
pub fn int_rows(schema: &SchemaRef, rows: &[&[i32]]) -> Vec<Row> {
    rows.iter()
        .map(|r| {
            let fields = r.iter().copied().map(Field::Int).collect();
            Row::from_fields(schema.clone(), fields).unwrap()
        })
        .collect()
}

/// A scan over integer rows. Width is taken from the first row (one column
/// when empty).
pub fn int_scan(rows: &[&[i32]]) -> VecScan {
    let width = rows.first().map_or(1, |r| r.len());
    let schema = int_schema(width).into_ref();
    let rows = int_rows(&schema, rows);
    VecScan::new(schema, rows)
}

/// A two-column integer table loaded with `rows`.
pub fn int_table(name: &str, rows: &[&[i32]], rows_per_page: usize) -> (MemoryDatabase, TableId) {
    let db = MemoryDatabase::new();
    let schema = int_schema(2);
    let table = db.add_table(name, schema.clone(), rows_per_page).unwrap();
    let schema = schema.into_ref();
    let tid = TransactionId::new();
    for row in int_rows(&schema, rows) {
        db.insert_row(tid, table, row).unwrap();
    }
    (db, table)
}

/// Pull every remaining row from an open operator as integers.
pub fn drain_ints(op: &mut dyn Operator) -> Vec<Vec<i32>> {
    let mut out = Vec::new();
    while op.has_next().unwrap() {
        let row = op.next().unwrap();
        out.push(row.fields().map(|f| f.and_then(Field::as_int).unwrap()).collect());
    }
    out
}

/// Shared view of a [`Tracked`] operator's lifecycle.
#[derive(Clone, Default)]
pub struct Lifecycle {
    open: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
}

impl Lifecycle {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Wraps an operator and records whether it is open and how often it was
/// closed. Can be told to fail `open`.
pub struct Tracked {
    inner: Box<dyn Operator>,
    fail_open: bool,
    lifecycle: Lifecycle,
    lookahead: Lookahead,
}

impl Tracked {
    pub fn new(inner: impl Operator + 'static) -> (Self, Lifecycle) {
        let lifecycle = Lifecycle::default();
        let tracked = Self {
            inner: Box::new(inner),
            fail_open: false,
            lifecycle: lifecycle.clone(),
            lookahead: Lookahead::new(),
        };
        (tracked, lifecycle)
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

impl PullOperator for Tracked {
    fn output_schema(&self) -> SchemaRef {
        self.inner.schema()
    }

    fn lookahead(&mut self) -> &mut Lookahead {
        &mut self.lookahead
    }

    fn on_open(&mut self) -> ExecuteResult<()> {
        if self.fail_open {
            return Err(SchemaError::UnsetField(0).into());
        }
        self.inner.open()?;
        self.lifecycle.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn fetch_next(&mut self) -> ExecuteResult<Option<Row>> {
        self.inner.next_row()
    }

    fn on_rewind(&mut self) -> ExecuteResult<()> {
        self.inner.rewind()
    }

    fn on_close(&mut self) {
        self.inner.close();
        self.lifecycle.open.store(false, Ordering::SeqCst);
        self.lifecycle.closes.fetch_add(1, Ordering::SeqCst);
    }
}
