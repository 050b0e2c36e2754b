//! Immutable routing table and its published handle.
//!
//! # Design Decisions
//! - A table is a value: built whole, never edited after publication
//! - `hosts[h]` already carries the fallback tier appended, so a lookup is
//!   a single ordered walk
//! - Publication is one `ArcSwap` store; readers see the old or the new
//!   table in full and never take a lock

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::routing::matcher::{match_route, RouteMatch};
use crate::routing::rule::{Backend, Rule};

/// Host → precedence-ordered rules. Serialization order is match order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingTable {
    pub generation: u64,
    pub hosts: BTreeMap<String, Vec<Rule>>,
    pub fallback: Vec<Rule>,
}

impl RoutingTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ordered rules consulted for `host` (already normalized).
    pub fn rules_for(&self, host: &str) -> &[Rule] {
        match self.hosts.get(host) {
            Some(rules) => rules,
            None => &self.fallback,
        }
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Distinct rules in the table (fallback rules counted once).
    pub fn rule_count(&self) -> usize {
        let fallback = self.fallback.len();
        let host_specific: usize = self
            .hosts
            .values()
            .map(|rules| rules.len() - fallback)
            .sum();
        host_specific + fallback
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn route(&self, host: &str, path: &str) -> RouteMatch<'_> {
        match_route(self, host, path)
    }
}

/// Shared, lock-free reference to the currently published table.
#[derive(Debug, Clone)]
pub struct TableHandle {
    current: Arc<ArcSwap<RoutingTable>>,
}

impl TableHandle {
    pub fn new(table: RoutingTable) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(table)),
        }
    }

    /// The table as of now. Holding the `Arc` keeps that version alive.
    pub fn snapshot(&self) -> Arc<RoutingTable> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }

    /// Atomically replace the published table.
    pub fn publish(&self, table: RoutingTable) {
        self.current.store(Arc::new(table));
    }

    /// Resolve a request against the current table.
    pub fn route(&self, host: &str, path: &str) -> Option<Backend> {
        let table = self.current.load();
        table.route(host, path).backend().cloned()
    }
}

impl Default for TableHandle {
    fn default() -> Self {
        Self::new(RoutingTable::empty())
    }
}
