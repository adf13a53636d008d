//! Core library for the `commander` CLI.
//!
//! `commander run` starts the same load test on every worker listed in a
//! client file, waits for each worker's result and stores it as
//! `<worker>.json`. `commander aggregate` merges a directory of such files
//! into one combined result, recomputing percentiles over the pooled
//! samples. The binary is the primary interface; library APIs may evolve
//! with it.
pub mod aggregate;
pub mod args;
pub mod config;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod logger;
pub mod registry;
pub mod result;
pub mod shutdown;
