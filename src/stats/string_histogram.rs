//! Histogram over text values, via a prefix-to-integer mapping.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use super::error::HistogramResult;
use super::histogram::IntHistogram;
use crate::tuple::Op;

/// Highest string the mapping distinguishes.
const UPPER_PREFIX: &str = "zzzz";

/// Map the first four bytes of `s` to an integer, big-endian, padding short
/// strings with zero bytes. Order-preserving on byte-wise prefixes.
fn prefix_value(s: &str) -> i64 {
    let mut value = 0i64;
    for i in 0..4 {
        let byte = s.as_bytes().get(i).copied().unwrap_or(0);
        value = (value << 8) | i64::from(byte);
    }
    value
}

/// Equi-width histogram over text values.
///
/// Strings map into `[prefix_value(""), prefix_value("zzzz")]`. Strings whose
/// prefix maps above that range (bytes past `z`) are clamped to the top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringHistogram {
    inner: IntHistogram,
}

impl StringHistogram {
    pub fn new(buckets: usize) -> HistogramResult<Self> {
        let (min, max) = Self::domain();
        Ok(Self {
            inner: IntHistogram::new(buckets, min, max)?,
        })
    }

    fn domain() -> (i32, i32) {
        // Both ends fit in i32; the top is 0x7a7a7a7a.
        let max = i32::try_from(prefix_value(UPPER_PREFIX)).unwrap_or(i32::MAX);
        (0, max)
    }

    /// Integer the histogram files `s` under.
    pub fn map_value(s: &str) -> i32 {
        let (min, max) = Self::domain();
        let raw = prefix_value(s);
        let clamped = raw.clamp(i64::from(min), i64::from(max));
        if clamped != raw {
            trace!(value = s, raw, clamped, "string outside histogram domain, clamped");
        }
        // In i32 range after the clamp.
        clamped as i32
    }

    /// Record one occurrence of `s`.
    pub fn add_value(&mut self, s: &str) -> HistogramResult<()> {
        self.inner.add_value(Self::map_value(s))
    }

    /// Estimated fraction of the added values satisfying `value op s`.
    ///
    /// LIKE is estimated as equality.
    pub fn estimate_selectivity(&self, op: Op, s: &str) -> f64 {
        self.inner.estimate_selectivity(op, Self::map_value(s))
    }

    pub fn avg_selectivity(&self) -> f64 {
        self.inner.avg_selectivity()
    }

    /// The backing integer histogram.
    pub fn histogram(&self) -> &IntHistogram {
        &self.inner
    }
}

impl fmt::Display for StringHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringHistogram over {}", self.inner)
    }
}
