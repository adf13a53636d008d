use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::result::{Bucket, HistogramData};

/// Largest count one [`SampleAccumulator::record_n`] call accepts.
pub const MAX_INSERTION_COUNT: u64 = i64::MAX.unsigned_abs();

/// Bucket midpoint used as an ordered map key.
#[derive(Debug, Clone, Copy)]
struct Midpoint(f64);

impl Midpoint {
    fn new(value: f64) -> Self {
        // folds -0.0 into 0.0
        Self(value + 0.0)
    }
}

impl PartialEq for Midpoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Midpoint {}

impl PartialOrd for Midpoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Midpoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Samples recorded at one midpoint, with the widest source interval seen.
#[derive(Debug, Clone, Copy)]
struct Slot {
    count: u64,
    start: f64,
    end: f64,
}

/// Summary moments reported by the source histograms themselves.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    inputs: usize,
    /// Some input's `Count` disagreed with the sum of its bucket counts.
    mismatched: bool,
    count: u64,
    min: f64,
    max: f64,
    sum: f64,
    sum_squares: f64,
    first_avg: f64,
    first_std_dev: f64,
}

impl Moments {
    fn add(&mut self, histogram: &HistogramData) {
        if histogram.bucket_total() != histogram.count {
            self.mismatched = true;
        }
        if histogram.count == 0 {
            return;
        }
        let count = histogram.count as f64;
        if self.inputs == 0 {
            self.min = histogram.min;
            self.max = histogram.max;
            self.first_avg = histogram.avg;
            self.first_std_dev = histogram.std_dev;
        } else {
            self.min = self.min.min(histogram.min);
            self.max = self.max.max(histogram.max);
        }
        self.inputs = self.inputs.saturating_add(1);
        self.count = self.count.saturating_add(histogram.count);
        self.sum += histogram.sum;
        self.sum_squares +=
            count * (histogram.std_dev * histogram.std_dev + histogram.avg * histogram.avg);
    }
}

/// Pooled sample population of one histogram field across many runs.
///
/// Every bucket is re-expanded into `count` samples at its midpoint, so the
/// merged distribution is exact up to the source bucketing: any sample is
/// off by at most half its bucket width.
#[derive(Debug, Clone, Default)]
pub struct SampleAccumulator {
    slots: BTreeMap<Midpoint, Slot>,
    moments: Moments,
    insertions: u64,
}

impl SampleAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` samples of `value` in one insertion.
    ///
    /// Non-positive counts are ignored.
    pub fn record_n(&mut self, value: f64, count: i64) {
        if count <= 0 {
            return;
        }
        let slot = self.slots.entry(Midpoint::new(value)).or_insert(Slot {
            count: 0,
            start: value,
            end: value,
        });
        slot.count = slot.count.saturating_add(count.unsigned_abs());
        self.insertions = self.insertions.saturating_add(1);
    }

    /// Re-expand one bucket at its midpoint.
    ///
    /// Counts above [`MAX_INSERTION_COUNT`] take several insertions whose
    /// counts add up to the bucket's count.
    pub fn add_bucket(&mut self, bucket: &Bucket) {
        if bucket.count == 0 {
            return;
        }
        let midpoint = bucket.midpoint();
        let mut remaining = bucket.count;
        while remaining > 0 {
            let chunk = i64::try_from(remaining).unwrap_or(i64::MAX);
            self.record_n(midpoint, chunk);
            remaining = remaining.saturating_sub(chunk.unsigned_abs());
        }
        if let Some(slot) = self.slots.get_mut(&Midpoint::new(midpoint)) {
            slot.start = slot.start.min(bucket.start.min(bucket.end));
            slot.end = slot.end.max(bucket.start.max(bucket.end));
        }
    }

    /// Fold a whole exported histogram in: its buckets and its moments.
    pub fn add_histogram(&mut self, histogram: &HistogramData) {
        for bucket in &histogram.data {
            self.add_bucket(bucket);
        }
        self.moments.add(histogram);
    }

    /// Pooled `(midpoint, count)` pairs in ascending midpoint order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.slots.iter().map(|(midpoint, slot)| (midpoint.0, slot.count))
    }

    /// Total number of pooled samples.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.slots
            .values()
            .fold(0u64, |acc, slot| acc.saturating_add(slot.count))
    }

    /// Number of [`SampleAccumulator::record_n`] calls so far.
    #[must_use]
    pub const fn insertions(&self) -> u64 {
        self.insertions
    }

    /// Export the pooled population with fresh percentile markers.
    ///
    /// Buckets come out in midpoint order and never overlap: each one starts
    /// no earlier than the previous end and ends no later than the next
    /// midpoint, so every bucket still contains its own midpoint and the
    /// percentile markers never decrease. Disjoint source buckets come out
    /// unchanged. Moments are taken from the sources when every source's
    /// `Count` matches its buckets, otherwise from midpoints.
    #[must_use]
    pub fn finalize(&self, percentiles: &[f64]) -> HistogramData {
        let total = self.total();
        let moments_usable = self.moments.inputs > 0
            && !self.moments.mismatched
            && self.moments.count == total;
        let mut histogram = if moments_usable {
            self.source_moments()
        } else {
            self.midpoint_moments(total)
        };

        let mut data = Vec::with_capacity(self.slots.len());
        let mut cumulative = 0u64;
        let mut previous_end = f64::NEG_INFINITY;
        let slots = self.slots.values().zip(self.slots.keys().skip(1).map(Some).chain([None]));
        for (slot, next) in slots {
            let next_midpoint = next.map_or(f64::INFINITY, |midpoint| midpoint.0);
            cumulative = cumulative.saturating_add(slot.count);
            let start = slot.start.max(previous_end);
            let end = slot.end.min(next_midpoint).max(start);
            previous_end = end;
            data.push(Bucket {
                start,
                end,
                percent: percent_of(cumulative, total),
                count: slot.count,
            });
        }
        histogram.data = data;
        histogram.set_percentiles(percentiles);
        histogram
    }

    fn source_moments(&self) -> HistogramData {
        let moments = &self.moments;
        let (avg, std_dev) = if moments.inputs == 1 {
            (moments.first_avg, moments.first_std_dev)
        } else {
            let count = moments.count as f64;
            let avg = moments.sum / count;
            (avg, variance_to_std_dev(moments.sum_squares / count - avg * avg))
        };
        HistogramData {
            count: moments.count,
            min: moments.min,
            max: moments.max,
            sum: moments.sum,
            avg,
            std_dev,
            ..HistogramData::default()
        }
    }

    fn midpoint_moments(&self, total: u64) -> HistogramData {
        if total == 0 {
            return HistogramData::default();
        }
        let (sum, sum_squares) = self.samples().fold((0.0, 0.0), |(sum, squares), (value, count)| {
            let count = count as f64;
            (sum + value * count, squares + value * value * count)
        });
        let count = total as f64;
        let avg = sum / count;
        HistogramData {
            count: total,
            min: self.slots.keys().next().map_or(0.0, |midpoint| midpoint.0),
            max: self.slots.keys().next_back().map_or(0.0, |midpoint| midpoint.0),
            sum,
            avg,
            std_dev: variance_to_std_dev(sum_squares / count - avg * avg),
            ..HistogramData::default()
        }
    }
}

fn percent_of(cumulative: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * cumulative as f64 / total as f64
}

fn variance_to_std_dev(variance: f64) -> f64 {
    // rounding can push a zero variance slightly negative
    variance.max(0.0).sqrt()
}
