//! pulldb - query execution and cost estimation core
//!
//! This crate provides the pull-based operator engine and the histogram
//! statistics of a disk-oriented relational kernel. Storage, locking and
//! catalog resolution are consumed through the traits in [`storage`].
//!
//! # Example
//!
//! ```
//! use pulldb::executor::{Join, JoinPredicate, Operator, SeqScan};
//! use pulldb::storage::{BufferPool, MemoryDatabase, TransactionId};
//! use pulldb::tuple::{Field, Op, Row, SchemaBuilder};
//!
//! let db = MemoryDatabase::new();
//! let schema = SchemaBuilder::new().int("id").build();
//! let a = db.add_table("a", schema.clone(), 64).unwrap();
//! let b = db.add_table("b", schema.clone(), 64).unwrap();
//!
//! let schema = schema.into_ref();
//! let tid = TransactionId::new();
//! for (table, ids) in [(a, [1, 2, 3]), (b, [2, 3, 4])] {
//!     for id in ids {
//!         let row = Row::from_fields(schema.clone(), vec![Field::Int(id)]).unwrap();
//!         db.insert_row(tid, table, row).unwrap();
//!     }
//! }
//!
//! let left = SeqScan::new(tid, a, None, &db).unwrap();
//! let right = SeqScan::new(tid, b, None, &db).unwrap();
//! let mut join = Join::new(JoinPredicate::new(0, Op::Equals, 0), Box::new(left), Box::new(right)).unwrap();
//!
//! join.open().unwrap();
//! let mut pairs = Vec::new();
//! while let Some(row) = join.next_row().unwrap() {
//!     pairs.push(row.to_string());
//! }
//! join.close();
//! assert_eq!(pairs, ["2\t2", "3\t3"]);
//! ```

pub mod executor;
pub mod stats;
pub mod storage;
pub mod tuple;

#[cfg(test)]
mod testutil;
