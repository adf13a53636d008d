//! Cancellation shared by every worker task of a dispatch.
//!
//! The flag only ever moves from `false` to `true`.
use tokio::sync::watch;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

pub type ShutdownSender = watch::Sender<bool>;
pub type ShutdownReceiver = watch::Receiver<bool>;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    watch::channel(false)
}

/// Resolve once shutdown has been requested.
///
/// Never resolves if the sender is dropped without requesting shutdown.
pub async fn wait_for_shutdown(shutdown_rx: &mut ShutdownReceiver) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Request shutdown on Ctrl+C (and SIGTERM on unix).
///
/// The task also exits when shutdown is requested by anyone else.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();

        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                () = wait_for_shutdown(&mut shutdown_rx) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!("Interrupted, cancelling outstanding workers.");
                    shutdown_tx.send_replace(true);
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    tracing::warn!("Terminated, cancelling outstanding workers.");
                    shutdown_tx.send_replace(true);
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                () = wait_for_shutdown(&mut shutdown_rx) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!("Interrupted, cancelling outstanding workers.");
                    shutdown_tx.send_replace(true);
                }
            }
        }
    })
}
