use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancellation` on Ctrl-C or, on unix, SIGTERM (what `hydrate stop` sends). Returns
/// early when something else cancels the token first.
///
/// On Windows detached processes can't detect signals sent to them, so there the daemon is
/// simply terminated.
pub async fn detect_shutdown(cancellation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            cancellation.cancel();
        },
        _ = terminate_signal() => {
            info!("Received termination signal, shutting down");
            cancellation.cancel();
        },
        _ = cancellation.cancelled() => (),
    };
}

#[cfg(unix)]
async fn terminate_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            terminate.recv().await;
        }
        Err(e) => {
            error!("Unable to listen for SIGTERM {e:?}");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn terminate_signal() {
    std::future::pending::<()>().await
}
