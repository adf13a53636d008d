use std::path::{Path, PathBuf};

use url::Url;

use crate::error::DispatchError;
use crate::registry::Worker;
use crate::result::AsyncReply;
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};

use super::policy::PollPolicy;
use super::transport::WorkerTransport;

/// Longest response excerpt quoted in an error.
const MAX_BODY_EXCERPT: usize = 512;

/// URL the start request for `worker` goes to.
///
/// # Errors
///
/// Returns an error if `path` cannot be joined onto the worker's base URL.
pub fn start_url_for(worker: &Worker, path: &str) -> Result<Url, DispatchError> {
    worker
        .base_url()
        .join(path)
        .map_err(|source| DispatchError::StartUrl {
            worker: worker.name().to_owned(),
            path: path.to_owned(),
            source,
        })
}

/// Point a worker-reported result URL at the worker's registered endpoint.
///
/// Workers report URLs using whatever host they believe they have, which is
/// often an internal address. Host and port are replaced; scheme, path and
/// query are kept. Relative URLs are resolved against the worker's base URL.
///
/// # Errors
///
/// Returns an error if the reported URL cannot be parsed or rewritten.
pub fn result_url_for(worker: &Worker, reported: &str) -> Result<Url, DispatchError> {
    let url_error = |source: url::ParseError| DispatchError::ResultUrl {
        worker: worker.name().to_owned(),
        url: reported.to_owned(),
        source,
    };
    let base = worker.base_url();
    let mut url = match Url::parse(reported) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(reported).map_err(url_error)?,
        Err(source) => return Err(url_error(source)),
    };
    url.set_host(base.host_str()).map_err(url_error)?;
    url.set_port(base.port())
        .map_err(|()| DispatchError::ResultHost {
            worker: worker.name().to_owned(),
            url: reported.to_owned(),
            endpoint: worker.endpoint().to_owned(),
        })?;
    Ok(url)
}

/// Start a run on `worker` and wait until its result is ready.
///
/// Returns the raw result bytes exactly as the worker sent them.
///
/// # Errors
///
/// Returns an error when the start request fails or is not understood, when
/// the worker reports `RunID` 0 (no polling happens then), when a configured
/// poll bound is exceeded, or when shutdown is requested.
pub async fn start_and_collect<T>(
    transport: &T,
    worker: &Worker,
    path: &str,
    payload: &[u8],
    policy: &PollPolicy,
    shutdown_rx: &mut ShutdownReceiver,
) -> Result<Vec<u8>, DispatchError>
where
    T: WorkerTransport + ?Sized,
{
    let reply = start_run(transport, worker, path, payload, policy, shutdown_rx).await?;
    let url = result_url_for(worker, &reply.result_url)?;
    tracing::info!(
        "[{}] run {} started, polling {}",
        worker.name(),
        reply.run_id,
        url
    );
    poll_result(transport, worker, &url, policy, shutdown_rx).await
}

async fn start_run<T>(
    transport: &T,
    worker: &Worker,
    path: &str,
    payload: &[u8],
    policy: &PollPolicy,
    shutdown_rx: &mut ShutdownReceiver,
) -> Result<AsyncReply, DispatchError>
where
    T: WorkerTransport + ?Sized,
{
    let url = start_url_for(worker, path)?;
    tracing::debug!("[{}] POST {} ({} bytes)", worker.name(), url, payload.len());
    let response = tokio::select! {
        response = transport.post(&url, payload) => {
            response.map_err(|source| DispatchError::StartRequest {
                worker: worker.name().to_owned(),
                source,
            })?
        }
        () = wait_for_shutdown(shutdown_rx) => {
            return Err(DispatchError::Cancelled {
                worker: worker.name().to_owned(),
            });
        }
        () = policy.deadline_reached() => {
            return Err(DispatchError::PollTimeout {
                worker: worker.name().to_owned(),
                attempts: 0,
                last: "start request still pending".to_owned(),
            });
        }
    };

    let reply: AsyncReply =
        serde_json::from_slice(&response.body).map_err(|source| DispatchError::DecodeReply {
            worker: worker.name().to_owned(),
            status: response.status,
            source,
        })?;
    if !reply.is_started() {
        let body = body_excerpt(&response.body);
        tracing::error!(
            "[{}] got unexpected results when starting test: {}",
            worker.name(),
            body
        );
        return Err(DispatchError::InvalidRunId {
            worker: worker.name().to_owned(),
            body,
        });
    }
    Ok(reply)
}

async fn poll_result<T>(
    transport: &T,
    worker: &Worker,
    url: &Url,
    policy: &PollPolicy,
    shutdown_rx: &mut ShutdownReceiver,
) -> Result<Vec<u8>, DispatchError>
where
    T: WorkerTransport + ?Sized,
{
    let mut attempts: u32 = 0;
    let mut last = String::from("no response yet");

    loop {
        attempts = attempts.saturating_add(1);
        let outcome = tokio::select! {
            outcome = transport.get(url) => outcome,
            () = wait_for_shutdown(shutdown_rx) => {
                return Err(DispatchError::Cancelled {
                    worker: worker.name().to_owned(),
                });
            }
            () = policy.deadline_reached() => {
                return Err(poll_timeout(worker, attempts, last));
            }
        };

        match outcome {
            Ok(response) if response.is_ok() => {
                tracing::debug!(
                    "[{}] result ready after {} attempt(s), {} bytes",
                    worker.name(),
                    attempts,
                    response.body.len()
                );
                return Ok(response.body);
            }
            Ok(response) => {
                last = format!("HTTP {}", response.status);
                tracing::debug!(
                    "[{}] result not ready (attempt {}): HTTP {}",
                    worker.name(),
                    attempts,
                    response.status
                );
            }
            Err(err) => {
                last = err.to_string();
                tracing::debug!(
                    "[{}] result poll failed (attempt {}): {}",
                    worker.name(),
                    attempts,
                    err
                );
            }
        }

        if policy.attempts_exhausted(attempts) {
            return Err(DispatchError::PollAttemptsExhausted {
                worker: worker.name().to_owned(),
                attempts,
                last,
            });
        }

        tokio::select! {
            () = tokio::time::sleep(policy.interval) => {}
            () = wait_for_shutdown(shutdown_rx) => {
                return Err(DispatchError::Cancelled {
                    worker: worker.name().to_owned(),
                });
            }
            () = policy.deadline_reached() => {
                return Err(poll_timeout(worker, attempts, last));
            }
        }
    }
}

fn poll_timeout(worker: &Worker, attempts: u32, last: String) -> DispatchError {
    DispatchError::PollTimeout {
        worker: worker.name().to_owned(),
        attempts,
        last,
    }
}

/// Store a collected result as `<out_dir>/<worker>.json`.
pub(super) async fn write_result(
    out_dir: &Path,
    worker: &Worker,
    bytes: &[u8],
) -> Result<PathBuf, DispatchError> {
    let path = out_dir.join(worker.result_file_name());
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| DispatchError::Write {
            worker: worker.name().to_owned(),
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

fn body_excerpt(body: &[u8]) -> String {
    let end = body.len().min(MAX_BODY_EXCERPT);
    String::from_utf8_lossy(body.get(..end).unwrap_or(body)).into_owned()
}
