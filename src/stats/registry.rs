//! Process-wide cache of table statistics, keyed by table name.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::{debug, info};

use super::config::StatsConfig;
use super::error::StatsResult;
use super::table_stats::TableStats;
use crate::storage::Catalog;

/// Map from table name to its statistics.
pub type StatsMap = HashMap<String, Arc<TableStats>>;

static GLOBAL: OnceLock<StatsRegistry> = OnceLock::new();

/// Statistics cache.
///
/// Thread-safe: can be shared across threads via Clone (uses Arc internally).
/// Most callers use [`StatsRegistry::global`]; tests can build private
/// instances or swap the global contents with [`StatsRegistry::replace_all`].
#[derive(Clone, Default)]
pub struct StatsRegistry {
    inner: Arc<RwLock<StatsMap>>,
}

impl StatsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created empty on first use.
    pub fn global() -> &'static StatsRegistry {
        GLOBAL.get_or_init(StatsRegistry::new)
    }

    /// Statistics for `table`, if computed.
    pub fn get(&self, table: &str) -> Option<Arc<TableStats>> {
        self.inner.read().get(table).cloned()
    }

    /// Store statistics under `table`, returning the previous entry.
    pub fn insert(&self, table: impl Into<String>, stats: Arc<TableStats>) -> Option<Arc<TableStats>> {
        self.inner.write().insert(table.into(), stats)
    }

    pub fn remove(&self, table: &str) -> Option<Arc<TableStats>> {
        self.inner.write().remove(table)
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> StatsMap {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Swap in a whole new map, returning the old one.
    pub fn replace_all(&self, stats: StatsMap) -> StatsMap {
        let mut guard = self.inner.write();
        debug!(old = guard.len(), new = stats.len(), "replacing statistics map");
        std::mem::replace(&mut *guard, stats)
    }

    /// Compute statistics for every catalog table and store them by name.
    ///
    /// Stops at the first table that fails; tables computed before it stay
    /// stored.
    pub fn compute_all(&self, catalog: &dyn Catalog, config: &StatsConfig) -> StatsResult<usize> {
        let tables = catalog.table_ids();
        info!(tables = tables.len(), "computing statistics for all tables");
        for &table in &tables {
            let stats = TableStats::compute(table, catalog, config)?;
            let name = stats.table_name().to_string();
            self.insert(name, stats.into_ref());
        }
        info!(tables = tables.len(), "statistics computed");
        Ok(tables.len())
    }
}
