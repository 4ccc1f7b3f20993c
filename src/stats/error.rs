//! Statistics errors.

use std::io;

use thiserror::Error;

use crate::storage::StorageError;
use crate::tuple::{SchemaError, Type};

/// Result type for histogram operations.
pub type HistogramResult<T> = Result<T, HistogramError>;

/// Result type for statistics operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Histogram construction and domain errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistogramError {
    #[error("histogram needs at least one bucket")]
    ZeroBuckets,

    #[error("invalid histogram range: min {min} > max {max}")]
    InvalidRange { min: i32, max: i32 },

    #[error("value {value} outside histogram range [{min}, {max}]")]
    OutOfRange { value: i32, min: i32, max: i32 },
}

/// Statistics errors.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("histogram error: {0}")]
    Histogram(#[from] HistogramError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field {field} is {expected}, constant is {actual}")]
    TypeMismatch {
        field: usize,
        expected: Type,
        actual: Type,
    },
}

impl StatsError {
    /// Check if this is a transaction abort coming from storage.
    pub fn is_abort(&self) -> bool {
        matches!(self, StatsError::Storage(e) if e.is_abort())
    }
}
