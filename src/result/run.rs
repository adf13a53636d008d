use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{HistogramData, null_as_default};

/// One worker's completed-run statistics.
///
/// Only the fields the aggregator merges are typed; everything else the
/// worker reports is carried through `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Empty on success.
    #[serde(
        rename = "Exception",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub exception: String,
    #[serde(rename = "ActualQPS", default)]
    pub actual_qps: f64,
    #[serde(rename = "NumConnections", default)]
    pub num_connections: i64,
    #[serde(rename = "NumThreads", default)]
    pub num_threads: i64,
    #[serde(rename = "StartTime", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<FixedOffset>>,
    /// Nanoseconds.
    #[serde(rename = "ActualDuration", default)]
    pub actual_duration: i64,
    /// Response count per HTTP status code. Codes are kept as strings, the
    /// way they appear as JSON object keys.
    #[serde(
        rename = "RetCodes",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub ret_codes: BTreeMap<String, i64>,
    #[serde(rename = "SocketCount", default)]
    pub socket_count: i64,
    #[serde(rename = "DurationHistogram", default)]
    pub duration_histogram: Option<HistogramData>,
    #[serde(rename = "ErrorsDurationHistogram", default)]
    pub errors_duration_histogram: Option<HistogramData>,
    #[serde(rename = "ConnectionStats", default)]
    pub connection_stats: Option<HistogramData>,
    #[serde(rename = "Sizes", default)]
    pub sizes: Option<HistogramData>,
    #[serde(rename = "HeaderSizes", default)]
    pub header_sizes: Option<HistogramData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunResult {
    /// Parse a result as written by a worker.
    ///
    /// # Errors
    ///
    /// Returns an error when the bytes are not a JSON result object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exception.is_empty()
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.actual_duration)
    }

    /// `start_time + actual_duration`, when the start is known.
    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<FixedOffset>> {
        self.start_time
            .and_then(|start| start.checked_add_signed(self.duration()))
    }
}
