//! Opaque handles passed through to the storage collaborators.

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifier of the transaction on whose behalf storage is accessed.
///
/// The execution core only carries it; locking and recovery are the
/// transaction manager's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(Ulid);

impl TransactionId {
    /// Generate a fresh, unique transaction id.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Raw ULID value.
    pub fn ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string().to_lowercase())
    }
}

/// Access mode requested when fetching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permissions {
    ReadOnly,
    ReadWrite,
}
