use thiserror::Error;

use super::{
    AggregateError, ConfigError, DispatchError, ErrorList, RegistryError, ValidationError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Client registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("{failed} of {total} workers failed:\n{errors}")]
    DispatchIncomplete {
        failed: usize,
        total: usize,
        errors: ErrorList<DispatchError>,
    },
    #[error("{failed} aggregation problem(s):\n{errors}")]
    AggregateIncomplete {
        failed: usize,
        errors: ErrorList<AggregateError>,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }
}
