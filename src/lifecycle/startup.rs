//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the rule store, table handle and reconciler
//! - Publish a first table before anything is served
//! - Start background tasks (watcher, reconciler, signals, metrics)
//! - Serve the admin API until shutdown

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::admin::AppState;
use crate::config::RouterConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::routing::{TableHandle, TableReconciler, TracingObserver};
use crate::store::{FileRuleStore, RulesWatcher};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("admin server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Run the router until a shutdown signal.
pub async fn run(config: RouterConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        // Address was checked by config validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    let rules_dir = Path::new(&config.rules.directory);
    let store = Arc::new(FileRuleStore::new(rules_dir));
    let reconciler = Arc::new(TableReconciler::new(
        store,
        TableHandle::default(),
        Arc::new(TracingObserver),
    ));

    if let Err(e) = reconciler.reconcile() {
        tracing::warn!(error = %e, "Initial rule snapshot failed, starting with an empty table");
    }

    let shutdown = Shutdown::new();

    let (change_tx, change_rx) = if config.rules.watch {
        let poll = Duration::from_secs(config.rules.poll_interval_secs);
        let (watcher, change_rx) = RulesWatcher::new(rules_dir, poll);
        let change_tx = watcher.sender();
        tokio::spawn(watcher.run(shutdown.subscribe()));
        (change_tx, change_rx)
    } else {
        tracing::info!("Rules watching disabled; rebuilds only on SIGHUP or admin request");
        mpsc::unbounded_channel()
    };

    let reconciler_task = tokio::spawn(reconciler.clone().run(change_rx, shutdown.subscribe()));

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signals::handle_signals(signal_shutdown.clone(), change_tx).await {
            tracing::error!(error = %e, "Signal handling failed, shutting down");
            signal_shutdown.trigger();
        }
    });

    if config.admin.enabled {
        let address = config.listener.bind_address.clone();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| StartupError::Bind { address, source })?;

        let server = HttpServer::new(AppState::new(reconciler, config.admin.api_key.clone()));
        server.run(listener, shutdown.subscribe()).await?;
    } else {
        let mut stop = shutdown.subscribe();
        let _ = stop.recv().await;
    }

    if let Err(e) = reconciler_task.await {
        tracing::error!(error = %e, "Reconciler task ended abnormally");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
