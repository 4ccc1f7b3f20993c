//! Row model: column types, values, schemas, rows and row locators.
//!
//! Everything here is a plain value type with no dependency on storage or
//! execution. Operators and statistics are built on top of it.

mod record_id;
mod row;
mod schema;
mod types;

pub use record_id::{PageId, RecordId, TableId};
pub use row::Row;
pub use schema::{ColumnDesc, Schema, SchemaBuilder, SchemaError, SchemaRef, SchemaResult};
pub use types::{Field, Op, Type, MAX_TEXT_LEN};
