use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use crate::aggregate::Percentiles;
use crate::args::{AggregateArgs, RunArgs};
use crate::dispatch::PollSettings;
use crate::error::{ConfigError, ValidationError};

use super::types::{AggregateConfig, DurationValue, RunConfig};

pub const DEFAULT_START_PATH: &str = "/fortio/rest/run";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything `commander run` needs, after command line, config file and
/// defaults have been combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub client_file: PathBuf,
    pub out_dir: PathBuf,
    pub path: String,
    pub payload: Option<PathBuf>,
    pub poll: PollSettings,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSettings {
    pub dir: PathBuf,
    pub percentiles: Percentiles,
    pub output: Option<PathBuf>,
}

/// Fill run options missing on the command line from the config file.
///
/// # Errors
///
/// Returns an error when the client file is set nowhere or a config value
/// is invalid.
pub fn apply_run_config(
    args: &RunArgs,
    config: Option<&RunConfig>,
) -> Result<RunSettings, ConfigError> {
    let defaults = RunConfig::default();
    let config = config.unwrap_or(&defaults);

    let client_file = args
        .client_file
        .clone()
        .or_else(|| config.client_file.clone())
        .ok_or(ConfigError::MissingOption {
            option: "client-file",
        })?;

    let max_attempts = match args.max_poll_attempts {
        Some(attempts) => Some(attempts),
        None => config
            .max_poll_attempts
            .map(|attempts| {
                NonZeroU32::new(attempts).ok_or(ConfigError::FieldMustBePositive {
                    field: "max_poll_attempts",
                    source: ValidationError::ValueTooSmall { min: 1 },
                })
            })
            .transpose()?,
    };

    let poll = PollSettings {
        interval: pick_duration(args.poll_interval, config.poll_interval.as_ref(), "poll_interval")?
            .unwrap_or(PollSettings::default().interval),
        max_attempts,
        deadline: pick_duration(args.deadline, config.deadline.as_ref(), "deadline")?,
    };

    Ok(RunSettings {
        client_file,
        out_dir: args
            .out_dir
            .clone()
            .or_else(|| config.out_dir.clone())
            .unwrap_or_else(|| PathBuf::from(".")),
        path: args
            .path
            .clone()
            .or_else(|| config.path.clone())
            .unwrap_or_else(|| DEFAULT_START_PATH.to_owned()),
        payload: args.payload.clone().or_else(|| config.payload.clone()),
        poll,
        request_timeout: pick_duration(
            args.request_timeout,
            config.request_timeout.as_ref(),
            "request_timeout",
        )?
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        connect_timeout: pick_duration(
            args.connect_timeout,
            config.connect_timeout.as_ref(),
            "connect_timeout",
        )?
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT),
    })
}

/// Fill aggregate options missing on the command line from the config file.
///
/// # Errors
///
/// Returns an error when the configured percentile list is invalid.
pub fn apply_aggregate_config(
    args: &AggregateArgs,
    config: Option<&AggregateConfig>,
) -> Result<AggregateSettings, ConfigError> {
    let percentiles = match (&args.percentiles, config.and_then(|c| c.percentiles.as_ref())) {
        (Some(percentiles), _) => percentiles.clone(),
        (None, Some(values)) => Percentiles::new(values.clone())
            .map_err(|source| ConfigError::InvalidPercentiles { source })?,
        (None, None) => Percentiles::default(),
    };
    Ok(AggregateSettings {
        dir: args.dir.clone(),
        percentiles,
        output: args
            .output
            .clone()
            .or_else(|| config.and_then(|c| c.output.clone())),
    })
}

fn pick_duration(
    cli: Option<Duration>,
    config: Option<&DurationValue>,
    field: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    if cli.is_some() {
        return Ok(cli);
    }
    config
        .map(|value| {
            value
                .to_duration()
                .map_err(|source| ConfigError::InvalidDuration { field, source })
        })
        .transpose()
}
