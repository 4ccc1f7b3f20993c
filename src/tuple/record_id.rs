//! Identifiers locating tables, pages and persisted rows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a table (heap file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub u64);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a page: owning table plus page number within that table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId {
    pub table: TableId,
    pub page_no: usize,
}

impl PageId {
    /// Create a new page id.
    pub fn new(table: TableId, page_no: usize) -> Self {
        Self { table, page_no }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.page_no)
    }
}

/// Locator of a persisted row: page plus slot number within the page.
///
/// Equality and hashing use both parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId {
    page_id: PageId,
    slot: usize,
}

impl RecordId {
    /// Create a new record id.
    pub fn new(page_id: PageId, slot: usize) -> Self {
        Self { page_id, slot }
    }

    /// Page holding the row.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Slot of the row within its page.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.page_id, self.slot)
    }
}
