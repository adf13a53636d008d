//! Command-line entry point: parse, configure, run one command.
use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use crate::aggregate::{aggregate_dir, to_pretty_json, write_atomic, write_stdout};
use crate::args::{Command, CommanderArgs};
use crate::config::{
    AggregateSettings, RunSettings, apply_aggregate_config, apply_run_config, load_config,
};
use crate::dispatch::{DispatchSettings, Dispatcher, HttpWorkerTransport};
use crate::error::{AppError, AppResult, ConfigError};
use crate::registry::ClientRegistry;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

/// Run the command selected on the command line.
///
/// # Errors
///
/// Returns an error when configuration is invalid, when any worker fails
/// during `run`, or when any input is skipped during `aggregate`.
pub fn run() -> AppResult<()> {
    let args = CommanderArgs::parse();
    crate::logger::init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Run(run_args) => {
            let section = config.as_ref().and_then(|config| config.run.as_ref());
            let settings = apply_run_config(&run_args, section)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_dispatch(settings))
        }
        Command::Aggregate(aggregate_args) => {
            let section = config.as_ref().and_then(|config| config.aggregate.as_ref());
            let settings = apply_aggregate_config(&aggregate_args, section)?;
            run_aggregate(&settings)
        }
    }
}

async fn run_dispatch(settings: RunSettings) -> AppResult<()> {
    let registry = ClientRegistry::load(&settings.client_file)?;
    let payload = read_payload(settings.payload.as_deref()).await?;
    let transport = HttpWorkerTransport::new(settings.request_timeout, settings.connect_timeout)?;
    let dispatcher = Dispatcher::new(
        Arc::new(transport),
        DispatchSettings {
            out_dir: settings.out_dir,
            path: settings.path,
            payload,
            poll: settings.poll,
        },
    );

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let report = dispatcher.run(&registry, &shutdown_rx).await;
    shutdown_tx.send_replace(true);
    if let Err(err) = signal_handle.await {
        tracing::debug!("Signal handler task ended abnormally: {}", err);
    }

    let written = report.into_result()?;
    tracing::info!("All {} worker result(s) written.", written.len());
    Ok(())
}

async fn read_payload(path: Option<&Path>) -> AppResult<Vec<u8>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    tokio::fs::read(path).await.map_err(|source| {
        AppError::config(ConfigError::ReadPayload {
            path: path.to_path_buf(),
            source,
        })
    })
}

fn run_aggregate(settings: &AggregateSettings) -> AppResult<()> {
    let outcome = aggregate_dir(&settings.dir, &settings.percentiles);
    if let Some(combined) = outcome.combined.as_ref() {
        let bytes = to_pretty_json(combined)?;
        match settings.output.as_deref() {
            Some(path) => {
                write_atomic(path, &bytes)?;
                tracing::info!("Combined result written to {}", path.display());
            }
            None => write_stdout(&bytes)?,
        }
    }
    if outcome.errors.is_empty() {
        return Ok(());
    }
    Err(AppError::AggregateIncomplete {
        failed: outcome.errors.len(),
        errors: outcome.errors,
    })
}
