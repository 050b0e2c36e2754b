//! Rebuild-and-publish orchestration.
//!
//! # Data Flow
//! ```text
//! ChangeEvent (admit / update / withdraw)
//!     → drain queued events (coalesce)
//!     → RuleStore::list_rule_sets (full snapshot)
//!     → builder::build
//!     → observer (conflicts, rejected rules)
//!     → TableHandle::publish (atomic swap)
//! ```
//!
//! # Design Decisions
//! - Full rebuild on every change; no incremental patching
//! - Writers are serialized; readers never wait on a rebuild
//! - A failed snapshot read leaves the previous table published

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use crate::observability::metrics;
use crate::routing::builder::{build, RejectedRule};
use crate::routing::collision::CollisionConflict;
use crate::routing::table::{RoutingTable, TableHandle};
use crate::store::{ChangeEvent, RuleStore, StoreError};

/// Rebuild failed; the previously published table is still in effect.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("rule store snapshot unreadable: {0}")]
    Store(#[from] StoreError),
}

/// What a successful reconciliation published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub generation: u64,
    pub rule_sets: usize,
    pub hosts: usize,
    pub rules: usize,
    pub conflicts: usize,
    pub rejected: usize,
}

/// Receives everything a reconciliation wants surfaced.
pub trait ReconcileObserver: Send + Sync {
    fn on_conflict(&self, conflict: &CollisionConflict);
    fn on_rejected(&self, rejected: &RejectedRule);
    fn on_published(&self, summary: &ReconcileSummary);
    fn on_rebuild_failed(&self, error: &ReconcileError);
}

/// Default observer: structured logs plus metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn on_conflict(&self, conflict: &CollisionConflict) {
        tracing::warn!(
            host = %conflict.host,
            path = %conflict.path,
            path_type = %conflict.path_type,
            dropped_origin = %conflict.dropped_origin,
            winning_origin = %conflict.winning_origin,
            "Rule collision resolved, dropping rule"
        );
        metrics::record_conflict();
    }

    fn on_rejected(&self, rejected: &RejectedRule) {
        tracing::warn!(
            origin = %rejected.origin,
            host = %rejected.host,
            path = %rejected.path,
            error = %rejected.error,
            "Invalid rule excluded from routing table"
        );
        metrics::record_rejected_rule(rejected.error.reason());
    }

    fn on_published(&self, summary: &ReconcileSummary) {
        tracing::info!(
            generation = summary.generation,
            rule_sets = summary.rule_sets,
            hosts = summary.hosts,
            rules = summary.rules,
            conflicts = summary.conflicts,
            rejected = summary.rejected,
            "Routing table published"
        );
        metrics::record_table(summary.generation, summary.hosts, summary.rules);
    }

    fn on_rebuild_failed(&self, error: &ReconcileError) {
        tracing::error!(error = %error, "Routing table rebuild failed. Keeping current table.");
    }
}

/// Rebuilds the routing table from the rule store and publishes it.
pub struct TableReconciler {
    store: Arc<dyn RuleStore>,
    handle: TableHandle,
    observer: Arc<dyn ReconcileObserver>,
    /// Writer lock; also owns the last published generation.
    generation: Mutex<u64>,
}

impl TableReconciler {
    pub fn new(store: Arc<dyn RuleStore>, handle: TableHandle, observer: Arc<dyn ReconcileObserver>) -> Self {
        let generation = Mutex::new(handle.generation());
        Self {
            store,
            handle,
            observer,
            generation,
        }
    }

    pub fn handle(&self) -> &TableHandle {
        &self.handle
    }

    /// Rebuild from a full snapshot and publish.
    pub fn reconcile(&self) -> Result<ReconcileSummary, ReconcileError> {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        let start = Instant::now();

        let rule_sets = match self.store.list_rule_sets() {
            Ok(rule_sets) => rule_sets,
            Err(e) => {
                let error = ReconcileError::from(e);
                metrics::record_reconcile("failed", start);
                self.observer.on_rebuild_failed(&error);
                return Err(error);
            }
        };

        let output = build(&rule_sets);
        for conflict in &output.conflicts {
            self.observer.on_conflict(conflict);
        }
        for rejected in &output.rejected {
            self.observer.on_rejected(rejected);
        }

        *generation += 1;
        let table: RoutingTable = output.table.with_generation(*generation);
        let summary = ReconcileSummary {
            generation: *generation,
            rule_sets: rule_sets.len(),
            hosts: table.host_count(),
            rules: table.rule_count(),
            conflicts: output.conflicts.len(),
            rejected: output.rejected.len(),
        };

        self.handle.publish(table);
        metrics::record_reconcile("published", start);
        self.observer.on_published(&summary);

        Ok(summary)
    }

    /// Change notification entry point. The payload is only a trigger.
    pub fn on_rule_set_change(&self, event: &ChangeEvent) -> Result<ReconcileSummary, ReconcileError> {
        tracing::debug!(kind = ?event.kind, source = ?event.source, "Rule set change received");
        self.reconcile()
    }

    /// Serve change notifications until shutdown or until the channel closes.
    ///
    /// Notifications queued while a rebuild runs are folded into the next one.
    pub async fn run(
        self: Arc<Self>,
        mut changes: mpsc::UnboundedReceiver<ChangeEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!("Table reconciler started");

        loop {
            tokio::select! {
                event = changes.recv() => {
                    let Some(event) = event else {
                        tracing::info!("Change channel closed, reconciler exiting");
                        break;
                    };

                    let mut coalesced = 0usize;
                    while changes.try_recv().is_ok() {
                        coalesced += 1;
                    }
                    if coalesced > 0 {
                        tracing::debug!(coalesced, "Coalesced queued change notifications");
                    }

                    // Store reads may block on disk. Errors were already
                    // surfaced through the observer.
                    let reconciler = Arc::clone(&self);
                    let rebuild = tokio::task::spawn_blocking(move || reconciler.on_rule_set_change(&event));
                    if let Err(e) = rebuild.await {
                        tracing::error!(error = %e, "Rebuild task failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reconciler received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
