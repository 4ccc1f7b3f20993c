//! Per-table statistics used for plan costing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::config::StatsConfig;
use super::error::{StatsError, StatsResult};
use super::histogram::IntHistogram;
use super::string_histogram::StringHistogram;
use crate::storage::{Catalog, DbFile, DbFileIterator, TransactionId};
use crate::tuple::{Field, Op, SchemaError, SchemaRef, TableId, Type};

/// Histogram of one column, by column type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "histogram", rename_all = "lowercase")]
pub enum ColumnHistogram {
    Int(IntHistogram),
    Text(StringHistogram),
}

impl ColumnHistogram {
    fn new(field_type: Type, buckets: usize, bounds: Option<(i32, i32)>) -> StatsResult<Self> {
        Ok(match field_type {
            Type::Int => {
                let (min, max) = bounds.unwrap_or((0, 0));
                ColumnHistogram::Int(IntHistogram::new(buckets, min, max)?)
            }
            Type::Text => ColumnHistogram::Text(StringHistogram::new(buckets)?),
        })
    }

    fn add(&mut self, field: usize, value: &Field) -> StatsResult<()> {
        match (self, value) {
            (ColumnHistogram::Int(h), Field::Int(v)) => h.add_value(*v)?,
            (ColumnHistogram::Text(h), Field::Text(s)) => h.add_value(s)?,
            (h, value) => {
                return Err(StatsError::TypeMismatch {
                    field,
                    expected: h.field_type(),
                    actual: value.field_type(),
                })
            }
        }
        Ok(())
    }

    /// Type of the column.
    pub fn field_type(&self) -> Type {
        match self {
            ColumnHistogram::Int(_) => Type::Int,
            ColumnHistogram::Text(_) => Type::Text,
        }
    }

    /// The integer histogram backing this column.
    pub fn as_int_histogram(&self) -> &IntHistogram {
        match self {
            ColumnHistogram::Int(h) => h,
            ColumnHistogram::Text(h) => h.histogram(),
        }
    }

    fn estimate(&self, op: Op, constant: &Field) -> Option<f64> {
        match (self, constant) {
            (ColumnHistogram::Int(h), Field::Int(v)) => Some(h.estimate_selectivity(op, *v)),
            (ColumnHistogram::Text(h), Field::Text(s)) => Some(h.estimate_selectivity(op, s)),
            _ => None,
        }
    }

    fn avg_selectivity(&self) -> f64 {
        match self {
            ColumnHistogram::Int(h) => h.avg_selectivity(),
            ColumnHistogram::Text(h) => h.avg_selectivity(),
        }
    }
}

/// Statistics for one table: row and page counts plus a histogram per column.
///
/// Built by scanning the table twice, once for integer column bounds and once
/// to fill the histograms.
#[derive(Debug, Clone)]
pub struct TableStats {
    table: TableId,
    table_name: String,
    schema: SchemaRef,
    num_pages: usize,
    total_rows: usize,
    io_cost_per_page: f64,
    columns: Vec<ColumnHistogram>,
    computed_at: DateTime<Utc>,
}

impl TableStats {
    /// Scan `table` and build its statistics.
    pub fn compute(table: TableId, catalog: &dyn Catalog, config: &StatsConfig) -> StatsResult<Self> {
        config.validate()?;
        let table_name = catalog.table_name(table)?;
        let file = catalog.table_file(table)?;
        let schema = file.schema();
        let tid = TransactionId::new();
        info!(table = %table_name, %tid, "computing table statistics");

        let mut iter = file.clone().scan(tid);
        let result = Self::scan_passes(iter.as_mut(), &schema, config);
        iter.close();
        let (columns, total_rows) = result?;

        let stats = Self {
            table,
            table_name,
            schema,
            num_pages: file.num_pages(),
            total_rows,
            io_cost_per_page: config.io_cost_per_page,
            columns,
            computed_at: Utc::now(),
        };
        info!(
            table = %stats.table_name,
            rows = stats.total_rows,
            pages = stats.num_pages,
            "table statistics ready"
        );
        Ok(stats)
    }

    fn scan_passes(
        iter: &mut dyn DbFileIterator,
        schema: &SchemaRef,
        config: &StatsConfig,
    ) -> StatsResult<(Vec<ColumnHistogram>, usize)> {
        // Pass 1: integer column bounds.
        let mut bounds: Vec<Option<(i32, i32)>> = vec![None; schema.num_fields()];
        iter.open()?;
        while let Some(row) = iter.next_row()? {
            for (i, slot) in bounds.iter_mut().enumerate() {
                if let Field::Int(v) = row.get(i)? {
                    let v = *v;
                    *slot = Some(match *slot {
                        Some((lo, hi)) => (lo.min(v), hi.max(v)),
                        None => (v, v),
                    });
                }
            }
        }

        let mut columns = schema
            .iter()
            .zip(&bounds)
            .map(|(col, b)| ColumnHistogram::new(col.field_type, config.histogram_buckets, *b))
            .collect::<StatsResult<Vec<_>>>()?;
        for (col, hist) in schema.iter().zip(&columns) {
            let h = hist.as_int_histogram();
            debug!(
                column = %col.name,
                min = h.min(),
                max = h.max(),
                width = h.bucket_width(),
                buckets = h.num_buckets(),
                "sized column histogram"
            );
        }

        // Pass 2: fill histograms and count rows.
        iter.rewind()?;
        let mut total_rows = 0usize;
        while let Some(row) = iter.next_row()? {
            for (i, hist) in columns.iter_mut().enumerate() {
                hist.add(i, row.get(i)?)?;
            }
            total_rows += 1;
        }
        Ok((columns, total_rows))
    }

    /// Id of the described table.
    pub fn table_id(&self) -> TableId {
        self.table
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Cost of a full sequential scan: pages times per-page I/O cost.
    pub fn estimate_scan_cost(&self) -> f64 {
        self.num_pages as f64 * self.io_cost_per_page
    }

    /// Rows expected after applying a predicate of the given selectivity.
    pub fn estimate_table_cardinality(&self, selectivity: f64) -> usize {
        (self.total_rows as f64 * selectivity).ceil().max(0.0) as usize
    }

    /// Estimated selectivity of `column[field] op constant`.
    pub fn estimate_selectivity(&self, field: usize, op: Op, constant: &Field) -> StatsResult<f64> {
        let hist = self.histogram(field)?;
        hist.estimate(op, constant)
            .ok_or_else(|| StatsError::TypeMismatch {
                field,
                expected: hist.field_type(),
                actual: constant.field_type(),
            })
    }

    /// Average selectivity of `column[field] op c` over constants `c` drawn
    /// from the column's values.
    pub fn avg_selectivity(&self, field: usize, op: Op) -> StatsResult<f64> {
        let eq = self.histogram(field)?.avg_selectivity();
        if self.total_rows == 0 {
            return Ok(if op == Op::NotEquals { 1.0 } else { 0.0 });
        }
        let strict = (1.0 - eq) / 2.0;
        let estimate = match op {
            Op::Equals | Op::Like => eq,
            Op::NotEquals => 1.0 - eq,
            Op::GreaterThan | Op::LessThan => strict,
            Op::GreaterThanOrEq | Op::LessThanOrEq => strict + eq,
        };
        Ok(estimate.clamp(0.0, 1.0))
    }

    /// Number of rows seen when the statistics were built.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    /// Histogram of column `field`.
    pub fn histogram(&self, field: usize) -> StatsResult<&ColumnHistogram> {
        self.columns.get(field).ok_or_else(|| {
            SchemaError::FieldIndexOutOfRange {
                index: field,
                len: self.columns.len(),
            }
            .into()
        })
    }

    pub fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }

    /// Serializable snapshot for diagnostics.
    pub fn summary(&self) -> StatsSummary {
        let columns = self
            .schema
            .iter()
            .zip(&self.columns)
            .map(|(col, hist)| {
                let h = hist.as_int_histogram();
                ColumnSummary {
                    name: col.name.clone(),
                    field_type: col.field_type,
                    min: h.min(),
                    max: h.max(),
                    bucket_width: h.bucket_width(),
                    values: h.total(),
                    bucket_counts: h.bucket_counts().to_vec(),
                }
            })
            .collect();

        StatsSummary {
            table: self.table_name.clone(),
            table_id: self.table,
            rows: self.total_rows,
            pages: self.num_pages,
            scan_cost: self.estimate_scan_cost(),
            computed_at: self.computed_at,
            columns,
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Per-column part of a [`StatsSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub field_type: Type,
    pub min: i32,
    pub max: i32,
    pub bucket_width: i64,
    pub values: u64,
    pub bucket_counts: Vec<u64>,
}

/// Snapshot of a table's statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub table: String,
    pub table_id: TableId,
    pub rows: usize,
    pub pages: usize,
    pub scan_cost: f64,
    pub computed_at: DateTime<Utc>,
    pub columns: Vec<ColumnSummary>,
}

impl StatsSummary {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> StatsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
