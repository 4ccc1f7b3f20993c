//! In-memory implementation of the storage interfaces.
//!
//! Tables are kept as vectors of slotted [`HeapPage`]s. This is the storage
//! used by the test suite and by embedders that do not need persistence.
//! Aborting a transaction makes every later storage call on its behalf fail,
//! which is how abort propagation through operator trees is exercised.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::errors::{StorageError, StorageResult};
use super::page::HeapPage;
use super::traits::{BufferPool, Catalog, DbFile, DbFileIterator};
use super::types::{Permissions, TransactionId};
use crate::tuple::{Field, PageId, RecordId, Row, Schema, SchemaError, SchemaRef, TableId};

/// Default number of row slots per page.
pub const DEFAULT_ROWS_PER_PAGE: usize = 64;

/// Transactions that have been aborted, shared by every table.
#[derive(Debug, Default)]
struct AbortSet {
    aborted: RwLock<HashSet<TransactionId>>,
}

impl AbortSet {
    fn check(&self, tid: TransactionId) -> StorageResult<()> {
        if self.aborted.read().contains(&tid) {
            return Err(StorageError::TransactionAborted(tid));
        }
        Ok(())
    }
}

/// A page-organized table held in memory.
#[derive(Debug)]
pub struct MemoryTable {
    id: TableId,
    schema: SchemaRef,
    rows_per_page: usize,
    pages: RwLock<Vec<Arc<HeapPage>>>,
    aborts: Arc<AbortSet>,
}

impl MemoryTable {
    /// Fetch page `page_no` on behalf of `tid`.
    pub fn page(&self, tid: TransactionId, page_no: usize) -> StorageResult<Arc<HeapPage>> {
        self.aborts.check(tid)?;
        self.pages
            .read()
            .get(page_no)
            .cloned()
            .ok_or(StorageError::PageNotFound(PageId::new(self.id, page_no)))
    }

    /// Number of live rows.
    pub fn num_rows(&self) -> usize {
        self.pages.read().iter().map(|p| p.rows().count()).sum()
    }

    fn insert(&self, row: Row) -> StorageResult<RecordId> {
        let fields = row
            .fields()
            .enumerate()
            .map(|(i, f)| f.cloned().ok_or(SchemaError::UnsetField(i)))
            .collect::<Result<Vec<Field>, _>>()?;
        let row = Row::from_fields(self.schema.clone(), fields)?;

        let mut pages = self.pages.write();
        let index = match pages.iter().position(|p| p.num_empty_slots() > 0) {
            Some(i) => i,
            None => {
                let page_id = PageId::new(self.id, pages.len());
                pages.push(Arc::new(HeapPage::new(page_id, self.rows_per_page)));
                pages.len() - 1
            }
        };
        let page = Arc::make_mut(&mut pages[index]);
        let page_id = page.id();
        page.insert(row).map_err(|_| StorageError::PageFull(page_id))
    }

    fn delete(&self, rid: RecordId) -> StorageResult<()> {
        let mut pages = self.pages.write();
        let page = pages
            .get_mut(rid.page_id().page_no)
            .ok_or(StorageError::PageNotFound(rid.page_id()))?;
        Arc::make_mut(page)
            .delete(rid.slot())
            .map(|_| ())
            .ok_or(StorageError::RecordNotFound(rid))
    }
}

impl DbFile for MemoryTable {
    fn id(&self) -> TableId {
        self.id
    }

    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn num_pages(&self) -> usize {
        self.pages.read().len()
    }

    fn scan(self: Arc<Self>, tid: TransactionId) -> Box<dyn DbFileIterator> {
        Box::new(MemoryTableIterator {
            table: self,
            tid,
            cursor: None,
        })
    }
}

/// Position of an open [`MemoryTableIterator`].
#[derive(Debug, Default)]
struct PageCursor {
    page_no: usize,
    page: Option<Arc<HeapPage>>,
    slot: usize,
}

/// Page-at-a-time iterator over a [`MemoryTable`].
struct MemoryTableIterator {
    table: Arc<MemoryTable>,
    tid: TransactionId,
    cursor: Option<PageCursor>,
}

impl DbFileIterator for MemoryTableIterator {
    fn open(&mut self) -> StorageResult<()> {
        self.cursor = Some(PageCursor::default());
        Ok(())
    }

    fn next_row(&mut self) -> StorageResult<Option<Row>> {
        let cursor = self.cursor.as_mut().ok_or(StorageError::IteratorClosed)?;
        loop {
            if cursor.page.is_none() {
                if cursor.page_no >= self.table.num_pages() {
                    return Ok(None);
                }
                cursor.page = Some(self.table.page(self.tid, cursor.page_no)?);
                cursor.slot = 0;
            }
            if let Some(page) = &cursor.page {
                while cursor.slot < page.num_slots() {
                    let slot = cursor.slot;
                    cursor.slot += 1;
                    if let Some(row) = page.row(slot) {
                        return Ok(Some(row.clone()));
                    }
                }
            }
            cursor.page = None;
            cursor.page_no += 1;
        }
    }

    fn rewind(&mut self) -> StorageResult<()> {
        let cursor = self.cursor.as_mut().ok_or(StorageError::IteratorClosed)?;
        *cursor = PageCursor::default();
        Ok(())
    }

    fn close(&mut self) {
        self.cursor = None;
    }
}

struct TableEntry {
    name: String,
    file: Arc<MemoryTable>,
}

struct MemoryDatabaseInner {
    tables: RwLock<BTreeMap<TableId, TableEntry>>,
    aborts: Arc<AbortSet>,
}

/// In-memory catalog plus buffer pool.
///
/// Cheap to clone; clones share the same tables.
#[derive(Clone)]
pub struct MemoryDatabase {
    inner: Arc<MemoryDatabaseInner>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryDatabaseInner {
                tables: RwLock::new(BTreeMap::new()),
                aborts: Arc::new(AbortSet::default()),
            }),
        }
    }

    /// Register a new empty table.
    pub fn add_table(
        &self,
        name: impl Into<String>,
        schema: Schema,
        rows_per_page: usize,
    ) -> StorageResult<TableId> {
        let name = name.into();
        let mut tables = self.inner.tables.write();
        if tables.values().any(|t| t.name == name) {
            return Err(StorageError::TableExists(name));
        }
        let id = TableId(tables.len() as u64);
        let file = Arc::new(MemoryTable {
            id,
            schema: schema.into_ref(),
            rows_per_page: rows_per_page.max(1),
            pages: RwLock::new(Vec::new()),
            aborts: self.inner.aborts.clone(),
        });
        debug!(table = %name, %id, "registered in-memory table");
        tables.insert(id, TableEntry { name, file });
        Ok(id)
    }

    /// Look up a table id by name.
    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.inner
            .tables
            .read()
            .iter()
            .find(|(_, t)| t.name == name)
            .map(|(id, _)| *id)
    }

    /// The concrete table behind `id`.
    pub fn table(&self, id: TableId) -> StorageResult<Arc<MemoryTable>> {
        self.inner
            .tables
            .read()
            .get(&id)
            .map(|t| t.file.clone())
            .ok_or(StorageError::TableNotFound(id))
    }

    /// Mark `tid` as aborted. Every later storage call for it fails.
    pub fn abort(&self, tid: TransactionId) {
        debug!(%tid, "transaction aborted");
        self.inner.aborts.aborted.write().insert(tid);
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog for MemoryDatabase {
    fn table_file(&self, table: TableId) -> StorageResult<Arc<dyn DbFile>> {
        let file: Arc<dyn DbFile> = self.table(table)?;
        Ok(file)
    }

    fn schema(&self, table: TableId) -> StorageResult<SchemaRef> {
        Ok(self.table(table)?.schema.clone())
    }

    fn table_name(&self, table: TableId) -> StorageResult<String> {
        self.inner
            .tables
            .read()
            .get(&table)
            .map(|t| t.name.clone())
            .ok_or(StorageError::TableNotFound(table))
    }

    fn table_ids(&self) -> Vec<TableId> {
        self.inner.tables.read().keys().copied().collect()
    }
}

impl BufferPool for MemoryDatabase {
    fn get_page(
        &self,
        tid: TransactionId,
        page: PageId,
        _perm: Permissions,
    ) -> StorageResult<Arc<HeapPage>> {
        self.table(page.table)?.page(tid, page.page_no)
    }

    fn insert_row(&self, tid: TransactionId, table: TableId, row: Row) -> StorageResult<()> {
        self.inner.aborts.check(tid)?;
        self.table(table)?.insert(row)?;
        Ok(())
    }

    fn delete_row(&self, tid: TransactionId, row: &Row) -> StorageResult<()> {
        self.inner.aborts.check(tid)?;
        let rid = row.record_id().ok_or(StorageError::MissingRecordId)?;
        self.table(rid.page_id().table)?.delete(rid)
    }
}
