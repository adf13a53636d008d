//! Configuration loading and application.
pub(crate) mod apply;
mod loader;
pub mod types;


pub use apply::{
    AggregateSettings, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_START_PATH,
    RunSettings, apply_aggregate_config, apply_run_config,
};
pub use loader::load_config;

#[cfg(test)]
pub(crate) use loader::load_config_file;
