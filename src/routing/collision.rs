//! Collision resolution between rules claiming the same
//! `(host, path, path_type)` slot.
//!
//! Policy, first difference decides:
//! 1. explicit `priority` (lower wins; a rule with a priority beats one without)
//! 2. older origin (`created` ascending)
//! 3. origin namespace, then name, lexically
//! 4. backend then extension data, lexically (same rule set declaring the
//!    slot twice)
//!
//! The comparison is a total order, so the winner of a slot does not depend
//! on the order rules were enumerated in.

use std::cmp::Ordering;

use serde::Serialize;

use crate::routing::rule::{Origin, PathType, Rule};

/// A resolved collision, reported to observers. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionConflict {
    pub host: String,
    pub path: String,
    pub path_type: PathType,
    pub dropped_origin: Origin,
    pub winning_origin: Origin,
}

impl CollisionConflict {
    pub fn new(winner: &Rule, loser: &Rule) -> Self {
        Self {
            host: winner.host.clone(),
            path: winner.path.clone(),
            path_type: winner.path_type,
            dropped_origin: loser.origin.clone(),
            winning_origin: winner.origin.clone(),
        }
    }
}

/// `Ordering::Less` means `a` wins over `b`.
pub fn precedence(a: &Rule, b: &Rule) -> Ordering {
    let by_priority = match (a.priority, b.priority) {
        (Some(pa), Some(pb)) => pa.cmp(&pb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_priority
        .then_with(|| a.origin.created.cmp(&b.origin.created))
        .then_with(|| a.origin.namespace.cmp(&b.origin.namespace))
        .then_with(|| a.origin.name.cmp(&b.origin.name))
        .then_with(|| a.backend.cmp(&b.backend))
        .then_with(|| a.extensions.cmp(&b.extensions))
}

/// Pick the winner of two colliding rules. Commutative.
pub fn resolve<'a>(a: &'a Rule, b: &'a Rule) -> &'a Rule {
    match precedence(a, b) {
        Ordering::Greater => b,
        _ => a,
    }
}
