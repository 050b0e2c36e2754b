//! OS signal handling.
//!
//! - SIGINT / SIGTERM trigger graceful shutdown
//! - SIGHUP queues a full rule resync

use tokio::sync::mpsc;

use crate::lifecycle::Shutdown;
use crate::store::ChangeEvent;

/// Translate OS signals until a shutdown signal arrives.
#[cfg(unix)]
pub async fn handle_signals(shutdown: Shutdown, resync: mpsc::UnboundedSender<ChangeEvent>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("SIGINT received");
                break;
            }
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received");
                break;
            }
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, queueing rule resync");
                if resync.send(ChangeEvent::resync()).is_err() {
                    tracing::warn!("Reconciler not running, resync dropped");
                }
            }
        }
    }

    shutdown.trigger();
    Ok(())
}

#[cfg(not(unix))]
pub async fn handle_signals(shutdown: Shutdown, _resync: mpsc::UnboundedSender<ChangeEvent>) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received");
    shutdown.trigger();
    Ok(())
}
