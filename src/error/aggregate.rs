use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Failed to read results directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read '{file}': {source}")]
    ReadFile {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse '{file}': {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed test at {file}: {exception}")]
    TestException { file: String, exception: String },
    #[error("No mergeable results found in '{path}'.")]
    NoMergeableResults { path: PathBuf },
    #[error("Failed to serialize combined result: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write combined result to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
