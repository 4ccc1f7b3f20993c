//! storage interfaces consumed by the execution core
//!
//! Page layout, caching, locking and catalog resolution live outside this
//! crate. The operators and the statistics pass only see the narrow traits
//! defined here, so any storage engine can sit underneath.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │   Catalog   │   │ BufferPool  │   │   DbFile    │
//! │ (metadata)  │   │ (pages/DML) │   │  (scans)    │
//! └─────────────┘   └─────────────┘   └─────────────┘
//!         │                │                 │
//!         └────────────────┼─────────────────┘
//!                          ▼
//!                 ┌─────────────────┐
//!                 │ MemoryDatabase  │
//!                 │ (reference impl)│
//!                 └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use pulldb::storage::{BufferPool, MemoryDatabase, TransactionId};
//! use pulldb::tuple::{Field, Row, SchemaBuilder};
//!
//! let db = MemoryDatabase::new();
//! let schema = SchemaBuilder::new().int("id").text("name").build();
//! let table = db.add_table("users", schema.clone(), 64).unwrap();
//!
//! let row = Row::from_fields(schema.into_ref(), vec![Field::Int(1), Field::text("Alice")]).unwrap();
//! db.insert_row(TransactionId::new(), table, row).unwrap();
//! ```

mod errors;
mod memory;
mod page;
mod traits;
mod types;

pub use errors::{StorageError, StorageResult};
pub use memory::{MemoryDatabase, MemoryTable, DEFAULT_ROWS_PER_PAGE};
pub use page::HeapPage;
pub use traits::{BufferPool, Catalog, DbFile, DbFileIterator};
pub use types::{Permissions, TransactionId};
