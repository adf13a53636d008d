//! Wire types shared by the dispatcher and the aggregator.
//!
//! Field names follow the load-generator workers' JSON convention
//! (`PascalCase`), so files written by `commander run` are byte-for-byte the
//! worker's own result and `commander aggregate` output can be fed back into
//! any tool that reads a single worker result.
mod histogram;
mod reply;
mod run;

#[cfg(test)]
mod tests;

pub use histogram::{Bucket, HistogramData, Percentile};
pub use reply::AsyncReply;
pub use run::RunResult;

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
