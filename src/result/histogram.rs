use serde::{Deserialize, Serialize};

use super::null_as_default;

/// One half-open interval `[start, end)` of a bucketed distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    #[serde(rename = "Start", default)]
    pub start: f64,
    #[serde(rename = "End", default)]
    pub end: f64,
    /// Cumulative percentage of samples up to and including this bucket.
    #[serde(rename = "Percent", default)]
    pub percent: f64,
    #[serde(rename = "Count", default)]
    pub count: u64,
}

impl Bucket {
    /// Value every sample of this bucket is re-recorded at when merging.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    #[serde(rename = "Percentile")]
    pub percentile: f64,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// Exported histogram: summary moments, buckets and percentile markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramData {
    #[serde(rename = "Count", default)]
    pub count: u64,
    #[serde(rename = "Min", default)]
    pub min: f64,
    #[serde(rename = "Max", default)]
    pub max: f64,
    #[serde(rename = "Sum", default)]
    pub sum: f64,
    #[serde(rename = "Avg", default)]
    pub avg: f64,
    #[serde(rename = "StdDev", default)]
    pub std_dev: f64,
    #[serde(rename = "Data", default, deserialize_with = "null_as_default")]
    pub data: Vec<Bucket>,
    #[serde(
        rename = "Percentiles",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub percentiles: Vec<Percentile>,
}

impl HistogramData {
    /// Sum of the bucket counts, which may differ from `count` in
    /// hand-written or truncated inputs.
    #[must_use]
    pub fn bucket_total(&self) -> u64 {
        self.data
            .iter()
            .fold(0u64, |acc, bucket| acc.saturating_add(bucket.count))
    }

    /// Estimate the value below which `percentile` percent of samples fall.
    ///
    /// Interpolates linearly inside the bucket holding the target rank. The
    /// lowest sample is assumed to cover at least `100 / count` percent, so
    /// anything at or below that share reports `min`; 100 and above report
    /// `max`.
    #[must_use]
    pub fn value_at_percentile(&self, percentile: f64) -> f64 {
        if self.data.is_empty() || self.count == 0 {
            return 0.0;
        }
        if percentile >= 100.0 {
            return self.max;
        }
        let mut previous = 100.0 / self.count as f64;
        if percentile <= previous {
            return self.min;
        }
        for bucket in &self.data {
            if percentile <= bucket.percent {
                return bucket.start
                    + (percentile - previous) / (bucket.percent - previous)
                        * (bucket.end - bucket.start);
            }
            previous = bucket.percent;
        }
        self.max
    }

    /// Recompute the percentile markers from the current buckets.
    pub fn set_percentiles(&mut self, percentiles: &[f64]) {
        self.percentiles = percentiles
            .iter()
            .map(|percentile| Percentile {
                percentile: *percentile,
                value: self.value_at_percentile(*percentile),
            })
            .collect();
    }
}
