//! Cost-estimation statistics.
//!
//! [`TableStats`] scans a table ahead of query execution and keeps one
//! equi-width histogram per column. The optimizer asks it for scan costs,
//! predicate selectivities and result cardinalities. Computed statistics are
//! cached by table name in a [`StatsRegistry`].
//!
//! # Usage
//!
//! ```
//! use pulldb::stats::{StatsConfig, StatsRegistry};
//! use pulldb::storage::{BufferPool, MemoryDatabase, TransactionId};
//! use pulldb::tuple::{Field, Op, Row, SchemaBuilder};
//!
//! let db = MemoryDatabase::new();
//! let schema = SchemaBuilder::new().int("age").build();
//! let table = db.add_table("people", schema.clone(), 64).unwrap();
//! let schema = schema.into_ref();
//! let tid = TransactionId::new();
//! for age in 1..=100 {
//!     let row = Row::from_fields(schema.clone(), vec![Field::Int(age)]).unwrap();
//!     db.insert_row(tid, table, row).unwrap();
//! }
//!
//! let registry = StatsRegistry::new();
//! registry.compute_all(&db, &StatsConfig::default()).unwrap();
//! let stats = registry.get("people").unwrap();
//! let sel = stats.estimate_selectivity(0, Op::GreaterThan, &Field::Int(50)).unwrap();
//! assert_eq!(stats.estimate_table_cardinality(sel), 50);
//! ```

mod config;
mod error;
mod histogram;
mod registry;
mod string_histogram;
mod table_stats;

pub use config::{StatsConfig, DEFAULT_HISTOGRAM_BUCKETS, DEFAULT_IO_COST_PER_PAGE};
pub use error::{HistogramError, HistogramResult, StatsError, StatsResult};
pub use histogram::IntHistogram;
pub use registry::{StatsMap, StatsRegistry};
pub use string_histogram::StringHistogram;
pub use table_stats::{ColumnHistogram, ColumnSummary, StatsSummary, TableStats};
