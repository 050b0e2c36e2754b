//! In-process rule store for embedders and tests.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;

use crate::routing::rule::RuleSet;
use crate::store::{ChangeEvent, ChangeKind, RuleStore, StoreError};

/// Rule sets keyed by `namespace/name`. Applying a set replaces it whole.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rule_sets: RwLock<BTreeMap<String, RuleSet>>,
    notifier: Option<mpsc::UnboundedSender<ChangeEvent>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that announces every change on the returned channel.
    pub fn with_notifier() -> (Self, mpsc::UnboundedReceiver<ChangeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Self {
            rule_sets: RwLock::default(),
            notifier: Some(tx),
        };
        (store, rx)
    }

    /// Admit or replace a rule set.
    pub fn apply(&self, rule_set: RuleSet) {
        let key = rule_set.key();
        let previous = self
            .rule_sets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), rule_set);

        let kind = if previous.is_some() {
            ChangeKind::Updated
        } else {
            ChangeKind::Admitted
        };
        self.notify(kind, key);
    }

    /// Withdraw a rule set. Returns whether it existed.
    pub fn withdraw(&self, namespace: &str, name: &str) -> bool {
        let key = format!("{}/{}", namespace, name);
        let removed = self
            .rule_sets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some();

        if removed {
            self.notify(ChangeKind::Withdrawn, key);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rule_sets.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self, kind: ChangeKind, key: String) {
        if let Some(tx) = &self.notifier {
            if tx.send(ChangeEvent::new(kind, Some(key))).is_err() {
                tracing::debug!("Change receiver dropped, notification discarded");
            }
        }
    }
}

impl RuleStore for MemoryRuleStore {
    fn list_rule_sets(&self) -> Result<Vec<RuleSet>, StoreError> {
        Ok(self
            .rule_sets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect())
    }
}
