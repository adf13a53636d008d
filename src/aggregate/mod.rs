//! Result aggregation: merge many workers' results into one.
//!
//! Percentiles are never averaged. Every histogram bucket is re-expanded
//! into samples at its midpoint, the samples of all runs are pooled, and
//! percentile markers are computed again over the pooled population.
mod accumulator;
mod aggregator;
mod merge;
mod output;
mod percentiles;


pub use accumulator::{MAX_INSERTION_COUNT, SampleAccumulator};
pub use aggregator::{AggregateOutcome, ResultAggregator, aggregate_dir};
pub use merge::merge_scalars;
pub use output::{to_pretty_json, write_atomic, write_stdout};
pub use percentiles::{DEFAULT_PERCENTILES, Percentiles};
