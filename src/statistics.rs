//! Histogram bucketing and summary statistics over facet samples.

use crate::facets::FacetTable;

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Mean, population standard deviation and count of a sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

/// Summarise a non-empty sample set. The standard deviation divides by N.
///
/// Callers must not pass an empty slice.
pub fn summary(samples: &[f64]) -> Summary {
    debug_assert!(!samples.is_empty(), "summary of an empty sample set");
    let mean = mean(samples);
    let variance = samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>()
        / samples.len() as f64;
    Summary {
        mean,
        std_dev: variance.sqrt(),
        count: samples.len(),
    }
}

/// Smallest and largest sample across every facet of `table`, or `None`
/// when there is nothing to render yet.
pub fn global_range(table: &FacetTable) -> Option<(f64, f64)> {
    let mut samples = table.all_samples();
    let first = samples.next()?;
    Some(samples.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Equal-width bin counts over `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
}

impl Buckets {
    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    pub fn midpoint(&self, index: usize) -> f64 {
        self.min + (index as f64 + 0.5) * self.width()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Bar heights scaled so the fullest bucket reaches `bar_height`.
    /// Any non-empty bucket is at least one unit tall.
    pub fn bar_heights(&self, bar_height: usize) -> Vec<usize> {
        let max_count = self.max_count();
        self.counts
            .iter()
            .map(|&count| {
                if count == 0 {
                    0
                } else {
                    let scaled = (count as f64 / max_count as f64 * bar_height as f64) as usize;
                    scaled.max(1)
                }
            })
            .collect()
    }
}

/// Result of bucketing a sample set.
#[derive(Debug, Clone, PartialEq)]
pub enum Histogram {
    /// No samples.
    Empty,
    /// `min == max`: all mass sits on one value, drawn as a fixed-height indicator.
    Degenerate { value: f64, count: usize },
    Buckets(Buckets),
}

/// Bucket index for `value`; values outside `[min, max]` clamp to the edge bins.
pub fn bucket_index(value: f64, min: f64, width: f64, bucket_count: usize) -> usize {
    let last = bucket_count.saturating_sub(1);
    // saturating cast: negatives and NaN land in bin 0
    (((value - min) / width) as usize).min(last)
}

/// Divide `[min, max]` into `bucket_count` equal-width bins and count `samples`.
///
/// A sample exactly at `max` falls in the last bin.
pub fn bucketize(samples: &[f64], min: f64, max: f64, bucket_count: usize) -> Histogram {
    if samples.is_empty() {
        return Histogram::Empty;
    }
    if min == max {
        return Histogram::Degenerate {
            value: min,
            count: samples.len(),
        };
    }

    let bucket_count = bucket_count.max(1);
    let width = (max - min) / bucket_count as f64;
    let mut counts = vec![0usize; bucket_count];
    for &v in samples {
        counts[bucket_index(v, min, width, bucket_count)] += 1;
    }
    Histogram::Buckets(Buckets { min, max, counts })
}

/// Heat intensity in `[0, 1]` on a log1p scale relative to `max_count`.
pub fn heat_level(count: usize, max_count: usize) -> f64 {
    if count == 0 || max_count == 0 {
        return 0.0;
    }
    ((count as f64).ln_1p() / (max_count as f64).ln_1p()).min(1.0)
}
