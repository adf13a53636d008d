use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::aggregate::Percentiles;

use super::parsers::{parse_duration_arg, parse_max_attempts, parse_percentiles};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Start a load test on many remote workers, collect their results and merge them into one report."
)]
pub struct CommanderArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (sets log level to debug unless overridden by COMMANDER_LOG/RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./commander.toml or ./commander.json if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Start a run on every worker in the client file and store each result
    Run(RunArgs),
    /// Merge every result file in a directory into one combined result
    Aggregate(AggregateArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    /// JSON file listing the workers as [{"name": ..., "uri": ...}]
    #[arg(long = "client-file", short = 'c')]
    pub client_file: Option<PathBuf>,

    /// Directory the per-worker result files are written to [default: .]
    #[arg(long = "outdir", short = 'o')]
    pub out_dir: Option<PathBuf>,

    /// HTTP path the start request is sent to [default: /fortio/rest/run]
    #[arg(long, short = 'p')]
    pub path: Option<String>,

    /// File holding the run payload sent with the start request (empty if omitted)
    #[arg(long, short = 'd')]
    pub payload: Option<PathBuf>,

    /// Pause between result polls (supports ms/s/m/h) [default: 1s]
    #[arg(long = "poll-interval", value_parser = parse_duration_arg)]
    pub poll_interval: Option<Duration>,

    /// Give up on a worker after this many result polls [default: unbounded]
    #[arg(long = "max-poll-attempts", value_parser = parse_max_attempts)]
    pub max_poll_attempts: Option<NonZeroU32>,

    /// Wall clock budget for the whole batch (supports ms/s/m/h) [default: none]
    #[arg(long, value_parser = parse_duration_arg)]
    pub deadline: Option<Duration>,

    /// Timeout for a single HTTP request (supports ms/s/m/h) [default: 60s]
    #[arg(long = "request-timeout", value_parser = parse_duration_arg)]
    pub request_timeout: Option<Duration>,

    /// Timeout for establishing a connection (supports ms/s/m/h) [default: 10s]
    #[arg(long = "connect-timeout", value_parser = parse_duration_arg)]
    pub connect_timeout: Option<Duration>,
}

#[derive(Debug, Args, Clone)]
pub struct AggregateArgs {
    /// Directory holding the worker result files
    pub dir: PathBuf,

    /// Comma separated percentiles to compute [default: 50,75,90,99,99.9]
    #[arg(long, value_parser = parse_percentiles)]
    pub percentiles: Option<Percentiles>,

    /// Write the combined result to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}
