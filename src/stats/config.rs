//! Statistics configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{StatsError, StatsResult};

/// Default number of histogram buckets per column.
pub const DEFAULT_HISTOGRAM_BUCKETS: usize = 100;

/// Default cost of reading one page.
pub const DEFAULT_IO_COST_PER_PAGE: f64 = 1000.0;

/// Knobs for building table statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Buckets per column histogram.
    pub histogram_buckets: usize,
    /// Cost of reading one page during a sequential scan.
    pub io_cost_per_page: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            histogram_buckets: DEFAULT_HISTOGRAM_BUCKETS,
            io_cost_per_page: DEFAULT_IO_COST_PER_PAGE,
        }
    }
}

impl StatsConfig {
    /// Parse and validate a JSON document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> StatsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> StatsResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> StatsResult<()> {
        if self.histogram_buckets == 0 {
            return Err(StatsError::InvalidConfig(
                "histogram_buckets must be positive".into(),
            ));
        }
        if !self.io_cost_per_page.is_finite() || self.io_cost_per_page <= 0.0 {
            return Err(StatsError::InvalidConfig(format!(
                "io_cost_per_page must be a positive number, got {}",
                self.io_cost_per_page
            )));
        }
        Ok(())
    }

    /// Set the number of histogram buckets.
    pub fn with_histogram_buckets(mut self, value: usize) -> Self {
        self.histogram_buckets = value;
        self
    }

    /// Set the per-page I/O cost.
    pub fn with_io_cost_per_page(mut self, value: f64) -> Self {
        self.io_cost_per_page = value;
        self
    }
}
