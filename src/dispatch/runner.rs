use std::path::PathBuf;
use std::sync::Arc;

use tokio::time::Instant;

use crate::error::{AppError, AppResult, DispatchError, ErrorList};
use crate::registry::{ClientRegistry, Worker};
use crate::shutdown::ShutdownReceiver;

use super::policy::{PollPolicy, PollSettings};
use super::transport::WorkerTransport;
use super::worker::{start_and_collect, write_result};

/// What every worker of a batch is asked to do.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub out_dir: PathBuf,
    pub path: String,
    pub payload: Vec<u8>,
    pub poll: PollSettings,
}

/// A result file persisted for one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenResult {
    pub worker: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Outcome of a batch: the files written and every individual failure.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub total: usize,
    pub written: Vec<WrittenResult>,
    pub errors: ErrorList<DispatchError>,
}

impl DispatchReport {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn the report into an error when anything failed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DispatchIncomplete`] carrying every recorded
    /// failure when at least one worker did not reach a written result.
    pub fn into_result(self) -> AppResult<Vec<WrittenResult>> {
        if self.errors.is_empty() {
            return Ok(self.written);
        }
        Err(AppError::DispatchIncomplete {
            failed: self.errors.len(),
            total: self.total,
            errors: self.errors,
        })
    }
}

/// Fans a batch out over every registered worker.
pub struct Dispatcher<T: ?Sized> {
    transport: Arc<T>,
    settings: Arc<DispatchSettings>,
}

impl<T> Dispatcher<T>
where
    T: WorkerTransport + ?Sized + 'static,
{
    #[must_use]
    pub fn new(transport: Arc<T>, settings: DispatchSettings) -> Self {
        Self {
            transport,
            settings: Arc::new(settings),
        }
    }

    /// Run one batch and wait for every worker task to finish.
    ///
    /// Each worker gets its own task; failures are collected here, at the
    /// join barrier, in registry order. Setting the shutdown flag cancels
    /// every task that is still waiting.
    pub async fn run(
        &self,
        registry: &ClientRegistry,
        shutdown_rx: &ShutdownReceiver,
    ) -> DispatchReport {
        let mut report = DispatchReport {
            total: registry.len(),
            ..DispatchReport::default()
        };

        let out_dir = &self.settings.out_dir;
        if let Err(source) = tokio::fs::create_dir_all(out_dir).await {
            report.errors.push(DispatchError::CreateOutDir {
                path: out_dir.clone(),
                source,
            });
            return report;
        }

        let policy = self.settings.poll.policy_from(Instant::now());
        tracing::info!(
            "Starting {} worker(s), results go to {}",
            registry.len(),
            out_dir.display()
        );

        let mut handles = Vec::with_capacity(registry.len());
        for worker in registry.workers() {
            let transport = Arc::clone(&self.transport);
            let settings = Arc::clone(&self.settings);
            let worker = worker.clone();
            let mut shutdown_rx = shutdown_rx.clone();
            let name = worker.name().to_owned();
            let handle = tokio::spawn(async move {
                run_worker(
                    transport.as_ref(),
                    &worker,
                    &settings,
                    &policy,
                    &mut shutdown_rx,
                )
                .await
            });
            handles.push((name, handle));
        }

        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(written)) => report.written.push(written),
                Ok(Err(err)) => {
                    tracing::warn!("{}", err);
                    report.errors.push(err);
                }
                Err(source) => {
                    tracing::error!("[{}] worker task aborted: {}", name, source);
                    report
                        .errors
                        .push(DispatchError::TaskJoin { worker: name, source });
                }
            }
        }

        tracing::info!(
            "Dispatch finished: {} written, {} failed",
            report.written.len(),
            report.errors.len()
        );
        report
    }
}

async fn run_worker<T>(
    transport: &T,
    worker: &Worker,
    settings: &DispatchSettings,
    policy: &PollPolicy,
    shutdown_rx: &mut ShutdownReceiver,
) -> Result<WrittenResult, DispatchError>
where
    T: WorkerTransport + ?Sized,
{
    let bytes = start_and_collect(
        transport,
        worker,
        &settings.path,
        &settings.payload,
        policy,
        shutdown_rx,
    )
    .await?;
    let path = write_result(&settings.out_dir, worker, &bytes).await?;
    tracing::info!("[{}] result written to {}", worker.name(), path.display());
    Ok(WrittenResult {
        worker: worker.name().to_owned(),
        path,
        bytes: bytes.len(),
    })
}
