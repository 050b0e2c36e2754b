//! Routing table construction.
//!
//! # Data Flow
//! ```text
//! RuleSet[] (any order)
//!     → validate each RuleSpec (invalid rules rejected, set still admitted)
//!     → group by (host, path, path_type) slot
//!     → collision.rs picks one winner per slot, losers reported
//!     → split host-specific / fallback, sort by classifier.rs key
//!     → append fallback tier to every host
//!     → RoutingTable
//! ```
//!
//! The output depends only on the set of inputs, never on their order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::routing::classifier::classify;
use crate::routing::collision::{precedence, CollisionConflict};
use crate::routing::rule::{Origin, PathType, Rule, RuleSet, ValidationError};
use crate::routing::table::RoutingTable;

/// A rule excluded from the table because it failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRule {
    pub origin: Origin,
    pub host: String,
    pub path: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ValidationError,
}

fn serialize_display<S: serde::Serializer>(error: &ValidationError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Result of one build: the table plus everything worth reporting.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub table: RoutingTable,
    pub conflicts: Vec<CollisionConflict>,
    pub rejected: Vec<RejectedRule>,
}

type Slot = (String, String, PathType);

/// Build a routing table from the full rule set collection.
pub fn build(rule_sets: &[RuleSet]) -> BuildOutput {
    let mut slots: BTreeMap<Slot, Vec<Rule>> = BTreeMap::new();
    let mut rejected = Vec::new();

    for rule_set in rule_sets {
        let origin = rule_set.origin();
        for spec in &rule_set.rules {
            match Rule::from_spec(spec, &origin) {
                Ok(rule) => {
                    let slot = (rule.host.clone(), rule.path.clone(), rule.path_type);
                    slots.entry(slot).or_default().push(rule);
                }
                Err(error) => rejected.push(RejectedRule {
                    origin: origin.clone(),
                    host: spec.host.clone(),
                    path: spec.path.clone(),
                    error,
                }),
            }
        }
    }

    let mut conflicts = Vec::new();
    let mut host_rules: BTreeMap<String, Vec<Rule>> = BTreeMap::new();
    let mut fallback = Vec::new();

    for (_, mut claimants) in slots {
        claimants.sort_by(precedence);
        let mut claimants = claimants.into_iter();
        let Some(winner) = claimants.next() else {
            continue;
        };

        conflicts.extend(claimants.map(|loser| CollisionConflict::new(&winner, &loser)));

        if winner.is_fallback() {
            fallback.push(winner);
        } else {
            host_rules.entry(winner.host.clone()).or_default().push(winner);
        }
    }

    fallback.sort_by_cached_key(classify);
    let hosts = host_rules
        .into_iter()
        .map(|(host, mut rules)| {
            rules.sort_by_cached_key(classify);
            rules.extend(fallback.iter().cloned());
            (host, rules)
        })
        .collect();

    rejected.sort_by(|a, b| {
        (&a.origin.namespace, &a.origin.name, &a.host, &a.path)
            .cmp(&(&b.origin.namespace, &b.origin.name, &b.host, &b.path))
    });

    BuildOutput {
        table: RoutingTable {
            generation: 0,
            hosts,
            fallback,
        },
        conflicts,
        rejected,
    }
}
