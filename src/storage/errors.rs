//! Storage layer error types
//!
//! These are the failures reported by the external storage collaborators
//! (catalog, buffer pool, heap files). The execution core never retries or
//! swallows them; they travel upward unchanged.

use thiserror::Error;

use crate::storage::types::TransactionId;
use crate::tuple::{PageId, RecordId, SchemaError, TableId};

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// the transaction was aborted by the lock/transaction manager
    #[error("transaction {0} aborted")]
    TransactionAborted(TransactionId),

    /// the requested table is not registered in the catalog
    #[error("table not found: {0}")]
    TableNotFound(TableId),

    /// a table with this name is already registered
    #[error("table already exists: {0}")]
    TableExists(String),

    /// the requested page does not exist
    #[error("page not found: {0}")]
    PageNotFound(PageId),

    /// the page has no free slot
    #[error("page full: {0}")]
    PageFull(PageId),

    /// the row has no locator, so it cannot be addressed on disk
    #[error("row has no record id")]
    MissingRecordId,

    /// the locator does not point at a live row
    #[error("no row stored at {0}")]
    RecordNotFound(RecordId),

    /// the row does not match the table's schema
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaError),

    /// the file iterator was used before open or after close
    #[error("file iterator is not open")]
    IteratorClosed,

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// check if this error is a transaction abort signal
    pub fn is_abort(&self) -> bool {
        matches!(self, StorageError::TransactionAborted(_))
    }

    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::TableNotFound(_)
                | StorageError::PageNotFound(_)
                | StorageError::RecordNotFound(_)
        )
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
