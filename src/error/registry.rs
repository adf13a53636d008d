use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read client list '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse client list '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Client list entry {index} has an empty name.")]
    EmptyName { index: usize },
    #[error("Client '{name}' has an empty endpoint.")]
    EmptyEndpoint { name: String },
    #[error("Client '{name}' is listed more than once.")]
    DuplicateName { name: String },
    #[error("Client name '{name}' cannot be used as a result file name.")]
    UnsafeName { name: String },
    #[error("Client '{name}' has an invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        name: String,
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Client list '{path}' does not contain any clients.")]
    Empty { path: PathBuf },
}
