//! Rules directory watcher.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use crate::store::{ChangeEvent, ChangeKind};

const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Watches the rules directory and forwards changes as rebuild triggers.
pub struct RulesWatcher {
    directory: PathBuf,
    poll_interval: Duration,
    change_tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl RulesWatcher {
    /// Returns the watcher and the receiving end of its change stream.
    pub fn new(directory: &Path, poll_interval: Duration) -> (Self, mpsc::UnboundedReceiver<ChangeEvent>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();
        (
            Self {
                directory: directory.to_path_buf(),
                poll_interval,
                change_tx,
            },
            change_rx,
        )
    }

    /// Sender for extra triggers (e.g. a forced resync).
    pub fn sender(&self) -> mpsc::UnboundedSender<ChangeEvent> {
        self.change_tx.clone()
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn start(&self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let Some(change) = change_for(&event) else {
                        return;
                    };
                    tracing::info!(kind = ?change.kind, source = ?change.source, "Rules change detected");
                    let _ = tx.send(change);
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&self.directory, RecursiveMode::NonRecursive)?;

        tracing::info!(directory = ?self.directory, "Rules watcher started");
        Ok(watcher)
    }

    /// Watch until shutdown.
    ///
    /// While the directory cannot be watched (missing, unreadable) the watch
    /// is retried every poll interval; rebuilds still happen on SIGHUP or an
    /// admin request. Once a retried watch succeeds a resync is sent so rule
    /// sets that appeared meanwhile are picked up.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut retry = tokio::time::interval(self.poll_interval.max(MIN_RETRY_INTERVAL));
        let mut failures = 0u32;

        let _watcher = loop {
            tokio::select! {
                _ = retry.tick() => {}
                _ = shutdown.recv() => return,
            }

            match self.start() {
                Ok(watcher) => {
                    if failures > 0 {
                        let _ = self.change_tx.send(ChangeEvent::resync());
                    }
                    break watcher;
                }
                Err(e) => {
                    if failures == 0 {
                        tracing::warn!(
                            directory = ?self.directory,
                            error = %e,
                            "Cannot watch rules directory, retrying"
                        );
                    }
                    failures = failures.saturating_add(1);
                }
            }
        };

        let _ = shutdown.recv().await;
    }
}

fn change_for(event: &Event) -> Option<ChangeEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Admitted,
        EventKind::Modify(_) => ChangeKind::Updated,
        EventKind::Remove(_) => ChangeKind::Withdrawn,
        EventKind::Any | EventKind::Other => ChangeKind::Resync,
        EventKind::Access(_) => return None,
    };
    let source = event.paths.first().map(|p| p.display().to_string());
    Some(ChangeEvent::new(kind, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, RemoveKind};

    #[test]
    fn test_event_mapping() {
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path("/rules/a.toml".into());
        let change = change_for(&create).unwrap();
        assert_eq!(change.kind, ChangeKind::Admitted);
        assert_eq!(change.source.as_deref(), Some("/rules/a.toml"));

        let remove = Event::new(EventKind::Remove(RemoveKind::File));
        assert_eq!(change_for(&remove).unwrap().kind, ChangeKind::Withdrawn);

        let access = Event::new(EventKind::Access(AccessKind::Any));
        assert!(change_for(&access).is_none());
    }

    #[tokio::test]
    async fn test_missing_directory_is_watched_once_created() {
        let root = tempfile::TempDir::new().unwrap();
        let directory = root.path().join("rules");

        let (watcher, mut changes) = RulesWatcher::new(&directory, Duration::from_millis(20));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = tokio::spawn(watcher.run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!task.is_finished());

        std::fs::create_dir(&directory).unwrap();
        let change = tokio::time::timeout(Duration::from_secs(5), changes.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change.kind, ChangeKind::Resync);

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }
}
