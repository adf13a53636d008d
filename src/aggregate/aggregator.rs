use std::path::{Path, PathBuf};

use crate::error::{AggregateError, ErrorList};
use crate::result::{HistogramData, RunResult};

use super::accumulator::SampleAccumulator;
use super::merge::merge_scalars;
use super::percentiles::Percentiles;

/// What one aggregation produced.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    /// `None` when no input could be merged.
    pub combined: Option<RunResult>,
    /// Number of inputs folded into `combined`.
    pub merged: usize,
    /// Every input that was skipped, and why.
    pub errors: ErrorList<AggregateError>,
}

impl AggregateOutcome {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Default)]
struct HistogramSet {
    duration: Option<SampleAccumulator>,
    errors_duration: Option<SampleAccumulator>,
    connection_stats: Option<SampleAccumulator>,
    sizes: Option<SampleAccumulator>,
    header_sizes: Option<SampleAccumulator>,
}

impl HistogramSet {
    fn add(&mut self, result: &RunResult) {
        fold(&mut self.duration, result.duration_histogram.as_ref());
        fold(
            &mut self.errors_duration,
            result.errors_duration_histogram.as_ref(),
        );
        fold(&mut self.connection_stats, result.connection_stats.as_ref());
        fold(&mut self.sizes, result.sizes.as_ref());
        fold(&mut self.header_sizes, result.header_sizes.as_ref());
    }

    fn apply(&self, combined: &mut RunResult, percentiles: &[f64]) {
        let finalize = |accumulator: &Option<SampleAccumulator>| {
            accumulator
                .as_ref()
                .map(|accumulator| accumulator.finalize(percentiles))
        };
        combined.duration_histogram = finalize(&self.duration);
        combined.errors_duration_histogram = finalize(&self.errors_duration);
        combined.connection_stats = finalize(&self.connection_stats);
        combined.sizes = finalize(&self.sizes);
        combined.header_sizes = finalize(&self.header_sizes);
    }
}

fn fold(accumulator: &mut Option<SampleAccumulator>, histogram: Option<&HistogramData>) {
    if let Some(histogram) = histogram {
        accumulator
            .get_or_insert_with(SampleAccumulator::new)
            .add_histogram(histogram);
    }
}

/// Incrementally merges worker results into one combined result.
///
/// Failed runs and unreadable inputs are recorded and never touch the
/// combined statistics. Fields the aggregator does not merge are taken from
/// the first merged input.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    percentiles: Percentiles,
    combined: Option<RunResult>,
    histograms: HistogramSet,
    merged: usize,
    errors: ErrorList<AggregateError>,
}

impl ResultAggregator {
    #[must_use]
    pub fn new(percentiles: Percentiles) -> Self {
        Self {
            percentiles,
            ..Self::default()
        }
    }

    /// Parse and fold one result file's content.
    pub fn add_bytes(&mut self, file: &str, bytes: &[u8]) {
        match RunResult::from_slice(bytes) {
            Ok(result) => self.add(file, result),
            Err(source) => self.record(AggregateError::Parse {
                file: file.to_owned(),
                source,
            }),
        }
    }

    /// Fold one parsed result, unless its run failed.
    pub fn add(&mut self, file: &str, result: RunResult) {
        if !result.succeeded() {
            self.record(AggregateError::TestException {
                file: file.to_owned(),
                exception: result.exception,
            });
            return;
        }
        self.histograms.add(&result);
        match self.combined.as_mut() {
            Some(combined) => merge_scalars(combined, &result),
            None => self.combined = Some(result),
        }
        self.merged = self.merged.saturating_add(1);
        tracing::debug!("Merged {}", file);
    }

    /// Record an input that could not be used.
    pub fn record(&mut self, error: AggregateError) {
        tracing::warn!("{}", error);
        self.errors.push(error);
    }

    /// Recompute the five histograms over the pooled samples and return
    /// the outcome.
    #[must_use]
    pub fn finish(self) -> AggregateOutcome {
        let Self {
            percentiles,
            combined,
            histograms,
            merged,
            errors,
        } = self;
        let combined = combined.map(|mut combined| {
            histograms.apply(&mut combined, percentiles.as_slice());
            combined
        });
        AggregateOutcome {
            combined,
            merged,
            errors,
        }
    }
}

/// Merge every regular file of `dir`, in file-name order.
///
/// Subdirectories are ignored. Per-file problems end up in
/// [`AggregateOutcome::errors`]; when nothing could be merged `combined` is
/// `None` and a [`AggregateError::NoMergeableResults`] is added.
#[must_use]
pub fn aggregate_dir(dir: &Path, percentiles: &Percentiles) -> AggregateOutcome {
    let mut aggregator = ResultAggregator::new(percentiles.clone());
    let files = match result_files(dir) {
        Ok(files) => files,
        Err(source) => {
            aggregator.record(AggregateError::ReadDir {
                path: dir.to_path_buf(),
                source,
            });
            return aggregator.finish();
        }
    };

    for path in &files {
        let file = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        match std::fs::read(path) {
            Ok(bytes) => aggregator.add_bytes(&file, &bytes),
            Err(source) => aggregator.record(AggregateError::ReadFile { file, source }),
        }
    }

    let mut outcome = aggregator.finish();
    if outcome.combined.is_none() {
        outcome.errors.push(AggregateError::NoMergeableResults {
            path: dir.to_path_buf(),
        });
    }
    tracing::info!(
        "Merged {} of {} file(s) from {}",
        outcome.merged,
        files.len(),
        dir.display()
    );
    outcome
}

fn result_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => files.push(path),
            Ok(_) => tracing::debug!("Skipping non-file {}", path.display()),
            Err(err) => tracing::debug!("Skipping {}: {}", path.display(), err),
        }
    }
    files.sort();
    Ok(files)
}
