//! Query execution errors.

use thiserror::Error;

use crate::storage::StorageError;
use crate::tuple::{SchemaError, Type};

use super::aggregator::AggregateOp;

/// Result type for query execution.
pub type ExecuteResult<T> = Result<T, ExecuteError>;

/// Misuse of the open/has_next/next/rewind/close protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IterationError {
    #[error("operator is not open")]
    NotOpen,

    #[error("operator is already open")]
    AlreadyOpen,

    #[error("no element available")]
    NoSuchElement,
}

/// Query execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Failure reported by storage, passed through untouched.
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("illegal iteration state: {0}")]
    Iteration(#[from] IterationError),

    #[error("aggregate {op} is not supported on {field_type} columns")]
    UnsupportedAggregate { op: AggregateOp, field_type: Type },

    #[error("schema mismatch: expected [{expected}], got [{actual}]")]
    SchemaMismatch { expected: String, actual: String },

    #[error("integer overflow: {0}")]
    Overflow(String),
}

impl ExecuteError {
    /// Check if this is a transaction abort coming from storage.
    pub fn is_abort(&self) -> bool {
        matches!(self, ExecuteError::Storage(e) if e.is_abort())
    }

    /// Check if this is an iteration-protocol violation.
    pub fn is_iteration_error(&self) -> bool {
        matches!(self, ExecuteError::Iteration(_))
    }

    /// Check if this was raised while setting up an operator.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ExecuteError::Schema(_)
                | ExecuteError::UnsupportedAggregate { .. }
                | ExecuteError::SchemaMismatch { .. }
        )
    }
}
