use std::path::PathBuf;

use thiserror::Error;

/// Failure to get any HTTP response from a worker.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("[{worker}] invalid start path '{path}': {source}")]
    StartUrl {
        worker: String,
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("[{worker}] start request failed: {source}")]
    StartRequest {
        worker: String,
        #[source]
        source: TransportError,
    },
    #[error("[{worker}] could not decode start reply (HTTP {status}): {source}")]
    DecodeReply {
        worker: String,
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error("[{worker}] got unexpected results when starting test (RunID 0): {body}")]
    InvalidRunId { worker: String, body: String },
    #[error("[{worker}] invalid result URL '{url}': {source}")]
    ResultUrl {
        worker: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("[{worker}] cannot rewrite result URL '{url}' to endpoint '{endpoint}'.")]
    ResultHost {
        worker: String,
        url: String,
        endpoint: String,
    },
    #[error("[{worker}] result not ready before deadline ({attempts} attempts, last: {last}).")]
    PollTimeout {
        worker: String,
        attempts: u32,
        last: String,
    },
    #[error("[{worker}] result not ready after {attempts} attempts (last: {last}).")]
    PollAttemptsExhausted {
        worker: String,
        attempts: u32,
        last: String,
    },
    #[error("[{worker}] cancelled while waiting for results.")]
    Cancelled { worker: String },
    #[error("[{worker}] failed to write '{path}': {source}")]
    Write {
        worker: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("[{worker}] worker task failed: {source}")]
    TaskJoin {
        worker: String,
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("Failed to create output directory '{path}': {source}")]
    CreateOutDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
}

impl DispatchError {
    /// Name of the worker this error belongs to, if any.
    #[must_use]
    pub fn worker(&self) -> Option<&str> {
        match self {
            Self::StartUrl { worker, .. }
            | Self::StartRequest { worker, .. }
            | Self::DecodeReply { worker, .. }
            | Self::InvalidRunId { worker, .. }
            | Self::ResultUrl { worker, .. }
            | Self::ResultHost { worker, .. }
            | Self::PollTimeout { worker, .. }
            | Self::PollAttemptsExhausted { worker, .. }
            | Self::Cancelled { worker }
            | Self::Write { worker, .. }
            | Self::TaskJoin { worker, .. } => Some(worker),
            Self::CreateOutDir { .. } | Self::BuildClient { .. } => None,
        }
    }
}
