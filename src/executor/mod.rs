//! Query execution engine.
//!
//! Uses the Volcano/Iterator model: every operator pulls rows one at a time
//! from the operators it owns. A tree is driven from the root by a single
//! caller through the [`Operator`] protocol.
//!
//! ```text
//!            Aggregate
//!                │
//!              Join
//!             ╱    ╲
//!        Filter    SeqScan
//!           │
//!        SeqScan
//! ```
//!
//! Each operator owns its children exclusively and closes them when it is
//! closed. Storage failures, including transaction aborts, surface unchanged
//! as [`ExecuteError::Storage`].
//!
//! # Example
//!
//! ```
//! use pulldb::executor::{Filter, Operator, Predicate, VecScan};
//! use pulldb::tuple::{Field, Op, Row, SchemaBuilder};
//!
//! let schema = SchemaBuilder::new().int("id").build().into_ref();
//! let rows = (1..=5)
//!     .map(|i| Row::from_fields(schema.clone(), vec![Field::Int(i)]).unwrap())
//!     .collect();
//!
//! let scan = VecScan::new(schema, rows);
//! let mut filter = Filter::new(Predicate::new(0, Op::GreaterThan, 3), Box::new(scan)).unwrap();
//! filter.open().unwrap();
//! let mut ids = Vec::new();
//! while let Some(row) = filter.next_row().unwrap() {
//!     ids.push(row.get(0).unwrap().as_int().unwrap());
//! }
//! filter.close();
//! assert_eq!(ids, [4, 5]);
//! ```

mod aggregate;
mod aggregator;
mod error;
mod filter;
mod join;
mod modify;
mod operator;
mod predicate;
mod project;
mod scan;

pub use aggregate::Aggregate;
pub use aggregator::{AggregateOp, Aggregator};
pub use error::{ExecuteError, ExecuteResult, IterationError};
pub use filter::Filter;
pub use join::Join;
pub use modify::{Delete, Insert};
pub use operator::{Lookahead, OpState, Operator, PullOperator};
pub use predicate::{JoinPredicate, Predicate};
pub use project::Project;
pub use scan::{SeqScan, VecScan};
