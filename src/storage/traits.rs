//! Interfaces of the external storage collaborators.
//!
//! The execution core consumes these and never implements page layout,
//! caching, locking or catalog resolution itself. Every call may fail with
//! [`StorageError::TransactionAborted`](super::StorageError::TransactionAborted),
//! which callers propagate unchanged.

use std::sync::Arc;

use super::errors::StorageResult;
use super::page::HeapPage;
use super::types::{Permissions, TransactionId};
use crate::tuple::{PageId, Row, SchemaRef, TableId};

/// Table metadata lookups.
pub trait Catalog: Send + Sync {
    /// Storage handle of the table.
    fn table_file(&self, table: TableId) -> StorageResult<Arc<dyn DbFile>>;

    /// Schema of the table.
    fn schema(&self, table: TableId) -> StorageResult<SchemaRef>;

    /// Name of the table.
    fn table_name(&self, table: TableId) -> StorageResult<String>;

    /// All registered tables.
    fn table_ids(&self) -> Vec<TableId>;
}

/// Page cache and row mutation entry point.
pub trait BufferPool: Send + Sync {
    /// Fetch a page on behalf of `tid`.
    fn get_page(
        &self,
        tid: TransactionId,
        page: PageId,
        perm: Permissions,
    ) -> StorageResult<Arc<HeapPage>>;

    /// Insert `row` into `table`.
    fn insert_row(&self, tid: TransactionId, table: TableId, row: Row) -> StorageResult<()>;

    /// Delete the stored row identified by `row`'s record id.
    fn delete_row(&self, tid: TransactionId, row: &Row) -> StorageResult<()>;
}

/// A table's on-disk file.
pub trait DbFile: Send + Sync {
    /// Id of the table stored in this file.
    fn id(&self) -> TableId;

    /// Schema of the stored rows.
    fn schema(&self) -> SchemaRef;

    /// Number of pages currently in the file.
    fn num_pages(&self) -> usize;

    /// Transaction-scoped iterator over every stored row, page by page.
    fn scan(self: Arc<Self>, tid: TransactionId) -> Box<dyn DbFileIterator>;
}

/// Row iterator over a [`DbFile`].
pub trait DbFileIterator: Send {
    /// Prepare for iteration from the first page.
    fn open(&mut self) -> StorageResult<()>;

    /// Get the next row, or None if exhausted.
    fn next_row(&mut self) -> StorageResult<Option<Row>>;

    /// Restart from the first page.
    fn rewind(&mut self) -> StorageResult<()>;

    /// Release the current page.
    fn close(&mut self);
}
