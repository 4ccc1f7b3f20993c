//! Equi-width histogram over a bounded integer domain.

use std::fmt;

use serde::Serialize;

use super::error::{HistogramError, HistogramResult};
use crate::tuple::Op;

/// Fixed-width histogram over `[min, max]`.
///
/// Space is one counter per bucket and `add_value` is O(1), independent of
/// how many values have been added. Bucket `b` covers the inclusive integer
/// range `[min + b*width, min + (b+1)*width - 1]`, cut off at `max`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntHistogram {
    min: i32,
    max: i32,
    width: i64,
    counts: Vec<u64>,
    total: u64,
}

impl IntHistogram {
    /// Create an empty histogram with `buckets` buckets over `[min, max]`.
    pub fn new(buckets: usize, min: i32, max: i32) -> HistogramResult<Self> {
        if buckets == 0 {
            return Err(HistogramError::ZeroBuckets);
        }
        if min > max {
            return Err(HistogramError::InvalidRange { min, max });
        }
        let range = i64::from(max) - i64::from(min) + 1;
        let buckets_i64 = i64::try_from(buckets).unwrap_or(i64::MAX);
        // ceil(range / buckets), at least one
        let width = ((range + buckets_i64 - 1) / buckets_i64).max(1);

        Ok(Self {
            min,
            max,
            width,
            counts: vec![0; buckets],
            total: 0,
        })
    }

    /// Record one occurrence of `v`.
    ///
    /// Values outside `[min, max]` are rejected and leave the histogram
    /// unchanged.
    pub fn add_value(&mut self, v: i32) -> HistogramResult<()> {
        if v < self.min || v > self.max {
            return Err(HistogramError::OutOfRange {
                value: v,
                min: self.min,
                max: self.max,
            });
        }
        let b = self.bucket_of(v);
        self.counts[b] += 1;
        self.total += 1;
        Ok(())
    }

    /// Estimated fraction of the added values satisfying `value op v`.
    pub fn estimate_selectivity(&self, op: Op, v: i32) -> f64 {
        let (less, equal, greater) = self.split(v);
        let estimate = match op {
            Op::Equals | Op::Like => equal,
            Op::NotEquals => 1.0 - equal,
            Op::GreaterThan => greater,
            Op::GreaterThanOrEq => greater + equal,
            Op::LessThan => less,
            Op::LessThanOrEq => less + equal,
        };
        estimate.clamp(0.0, 1.0)
    }

    /// Expected equality selectivity for a constant drawn from the added
    /// values.
    pub fn avg_selectivity(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(b, &c)| {
                let fraction = c as f64 / total;
                fraction * (fraction / self.span(b) as f64)
            })
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Nominal width of every bucket.
    pub fn bucket_width(&self) -> i64 {
        self.width
    }

    pub fn num_buckets(&self) -> usize {
        self.counts.len()
    }

    /// Number of values added.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn bucket_counts(&self) -> &[u64] {
        &self.counts
    }

    fn bucket_of(&self, v: i32) -> usize {
        let offset = i64::from(v) - i64::from(self.min);
        // In range because width * buckets >= max - min + 1.
        ((offset / self.width) as usize).min(self.counts.len() - 1)
    }

    /// Inclusive bounds of bucket `b`.
    fn bounds(&self, b: usize) -> (i64, i64) {
        let lo = i64::from(self.min) + b as i64 * self.width;
        let hi = (lo + self.width - 1).min(i64::from(self.max));
        (lo, hi)
    }

    /// Number of integers bucket `b` covers.
    fn span(&self, b: usize) -> i64 {
        let (lo, hi) = self.bounds(b);
        (hi - lo + 1).max(1)
    }

    /// Estimated fractions strictly below, equal to and strictly above `v`.
    fn split(&self, v: i32) -> (f64, f64, f64) {
        if v < self.min {
            return (0.0, 0.0, 1.0);
        }
        if v > self.max {
            return (1.0, 0.0, 0.0);
        }
        if self.total == 0 {
            return (0.0, 0.0, 0.0);
        }

        let total = self.total as f64;
        let b = self.bucket_of(v);
        let (lo, hi) = self.bounds(b);
        let span = self.span(b) as f64;
        let v = i64::from(v);
        let fraction = self.counts[b] as f64 / total;

        let below: u64 = self.counts[..b].iter().sum();
        let above: u64 = self.counts[b + 1..].iter().sum();

        let less = (v - lo) as f64 / span * fraction + below as f64 / total;
        let greater = (hi - v) as f64 / span * fraction + above as f64 / total;
        let equal = fraction / span;
        (less, equal, greater)
    }
}

impl fmt::Display for IntHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IntHistogram[{}..={}, width {}, {} values]:",
            self.min, self.max, self.width, self.total
        )?;
        for (b, count) in self.counts.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let (lo, hi) = self.bounds(b);
            write!(f, " [{}..={}]={}", lo, hi, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform() -> IntHistogram {
        let mut h = IntHistogram::new(10, 1, 100).unwrap();
        for v in 1..=100 {
            h.add_value(v).unwrap();
        }
        h
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_uniform_estimates() {
        let h = uniform();
        assert_eq!(h.bucket_width(), 10);
        assert!(close(h.estimate_selectivity(Op::Equals, 50), 0.01));
        assert_eq!(h.estimate_selectivity(Op::GreaterThan, 100), 0.0);
        assert_eq!(h.estimate_selectivity(Op::LessThan, 1), 0.0);
        assert!(close(h.estimate_selectivity(Op::LessThanOrEq, 100), 1.0));
        assert!(close(h.estimate_selectivity(Op::GreaterThan, 50), 0.5));
        assert!(close(h.estimate_selectivity(Op::NotEquals, 50), 0.99));
    }

    #[test]
    fn test_out_of_domain_constants() {
        let h = uniform();
        assert_eq!(h.estimate_selectivity(Op::GreaterThan, 0), 1.0);
        assert_eq!(h.estimate_selectivity(Op::GreaterThanOrEq, -5), 1.0);
        assert_eq!(h.estimate_selectivity(Op::LessThan, 0), 0.0);
        assert_eq!(h.estimate_selectivity(Op::Equals, 0), 0.0);
        assert_eq!(h.estimate_selectivity(Op::NotEquals, 0), 1.0);

        assert_eq!(h.estimate_selectivity(Op::LessThan, 101), 1.0);
        assert_eq!(h.estimate_selectivity(Op::LessThanOrEq, 500), 1.0);
        assert_eq!(h.estimate_selectivity(Op::GreaterThan, 101), 0.0);
        assert_eq!(h.estimate_selectivity(Op::Like, 101), 0.0);
    }

    #[test]
    fn test_complementary_and_monotone() {
        let mut h = IntHistogram::new(7, -20, 45).unwrap();
        for v in [-20, -3, -3, 0, 1, 1, 1, 8, 19, 30, 44, 45, 45] {
            h.add_value(v).unwrap();
        }

        let mut previous = f64::INFINITY;
        for v in -20..=45 {
            let gt = h.estimate_selectivity(Op::GreaterThan, v);
            let lte = h.estimate_selectivity(Op::LessThanOrEq, v);
            assert!((gt + lte - 1.0).abs() < 1e-9, "v = {}", v);
            assert!(gt <= previous + 1e-12, "v = {}", v);
            for op in Op::ALL {
                let s = h.estimate_selectivity(op, v);
                assert!((0.0..=1.0).contains(&s));
            }
            previous = gt;
        }
    }

    #[test]
    fn test_short_last_bucket() {
        // Width 3: [0..=2] [3..=5] [6..=8] [9..=10].
        let mut h = IntHistogram::new(4, 0, 10).unwrap();
        for v in 0..=10 {
            h.add_value(v).unwrap();
        }
        assert_eq!(h.bucket_width(), 3);
        assert_eq!(h.bucket_counts(), &[3, 3, 3, 2]);

        // Both buckets hold one value per integer, so equality is uniform.
        assert!(close(h.estimate_selectivity(Op::Equals, 9), 1.0 / 11.0));
        assert!(close(h.estimate_selectivity(Op::Equals, 0), 1.0 / 11.0));
        assert!(close(h.estimate_selectivity(Op::GreaterThan, 9), 1.0 / 11.0));
        assert!(close(h.estimate_selectivity(Op::LessThan, 9), 9.0 / 11.0));
        assert_eq!(h.estimate_selectivity(Op::GreaterThan, 10), 0.0);
        assert!(close(h.estimate_selectivity(Op::LessThanOrEq, 10), 1.0));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut h = IntHistogram::new(4, 0, 10).unwrap();
        h.add_value(3).unwrap();
        let before = h.clone();

        assert!(matches!(
            h.add_value(11),
            Err(HistogramError::OutOfRange { value: 11, min: 0, max: 10 })
        ));
        assert!(h.add_value(-1).is_err());
        assert_eq!(h, before);
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(IntHistogram::new(0, 1, 2), Err(HistogramError::ZeroBuckets));
        assert_eq!(
            IntHistogram::new(3, 5, 4),
            Err(HistogramError::InvalidRange { min: 5, max: 4 })
        );
    }

    #[test]
    fn test_more_buckets_than_values() {
        let mut h = IntHistogram::new(100, 0, 0).unwrap();
        assert_eq!(h.bucket_width(), 1);
        h.add_value(0).unwrap();
        assert!(close(h.estimate_selectivity(Op::Equals, 0), 1.0));
        assert_eq!(h.estimate_selectivity(Op::GreaterThan, 0), 0.0);
    }

    #[test]
    fn test_extreme_domain() {
        let mut h = IntHistogram::new(3, i32::MIN, i32::MAX).unwrap();
        h.add_value(i32::MIN).unwrap();
        h.add_value(i32::MAX).unwrap();
        assert_eq!(h.bucket_counts()[0], 1);
        assert_eq!(h.bucket_counts()[2], 1);
        assert!(close(h.estimate_selectivity(Op::LessThan, 0), 0.5));
    }

    #[test]
    fn test_empty_histogram() {
        let h = IntHistogram::new(10, 1, 100).unwrap();
        assert_eq!(h.estimate_selectivity(Op::Equals, 50), 0.0);
        assert_eq!(h.estimate_selectivity(Op::GreaterThan, 50), 0.0);
        assert_eq!(h.estimate_selectivity(Op::NotEquals, 50), 1.0);
        assert_eq!(h.avg_selectivity(), 0.0);
    }

    #[test]
    fn test_avg_selectivity() {
        assert!(close(uniform().avg_selectivity(), 0.01));

        let mut skewed = IntHistogram::new(2, 0, 1).unwrap();
        for _ in 0..3 {
            skewed.add_value(0).unwrap();
        }
        skewed.add_value(1).unwrap();
        assert!(close(skewed.avg_selectivity(), 0.75 * 0.75 + 0.25 * 0.25));
    }

    #[test]
    fn test_display() {
        let mut h = IntHistogram::new(2, 0, 9).unwrap();
        h.add_value(7).unwrap();
        assert_eq!(h.to_string(), "IntHistogram[0..=9, width 5, 1 values]: [5..=9]=1");
    }
}
