//! Dispatcher: start a run on every worker, wait for each result, persist it.
//!
//! One task per worker, joined at a single barrier. A worker's failure is
//! recorded in the [`DispatchReport`] and never stops its siblings.
mod policy;
mod runner;
mod transport;
mod worker;


pub use policy::{DEFAULT_POLL_INTERVAL, PollPolicy, PollSettings};
pub use runner::{DispatchReport, DispatchSettings, Dispatcher, WrittenResult};
pub use transport::{HttpWorkerTransport, RawResponse, WorkerTransport};
pub use worker::{result_url_for, start_and_collect, start_url_for};
