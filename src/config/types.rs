use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::args::parse_duration_arg;
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub run: Option<RunConfig>,
    pub aggregate: Option<AggregateConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub client_file: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub path: Option<String>,
    pub payload: Option<PathBuf>,
    pub poll_interval: Option<DurationValue>,
    pub max_poll_attempts: Option<u32>,
    pub deadline: Option<DurationValue>,
    pub request_timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateConfig {
    pub percentiles: Option<Vec<f64>>,
    pub output: Option<PathBuf>,
}

/// A duration written either as whole seconds or as a `10s`/`500ms` string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
