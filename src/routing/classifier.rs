//! Rule specificity ranking.
//!
//! # Ordering (most specific first)
//! 1. Host-specific rules before fallback (empty host) rules
//! 2. `Exact` before prefix-like (`Prefix`, `ImplementationSpecific`)
//! 3. Longer normalized path before shorter
//! 4. `Prefix` before `ImplementationSpecific` at equal length
//! 5. Lexical path order for equal-length distinct paths
//!
//! An `Exact` rule only ever accepts its own literal path, so trying every
//! exact rule first can never shadow a more specific prefix.

use std::cmp::{Ordering, Reverse};

use crate::routing::rule::{PathType, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Host,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchClass {
    Exact,
    PrefixLike,
}

/// Sort key for a rule. Ascending order is precedence order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpecificityKey {
    tier: Tier,
    class: MatchClass,
    length: Reverse<usize>,
    type_rank: u8,
    path: String,
}

/// Compute the specificity key of a rule.
pub fn classify(rule: &Rule) -> SpecificityKey {
    let (class, type_rank) = match rule.path_type {
        PathType::Exact => (MatchClass::Exact, 0),
        PathType::Prefix => (MatchClass::PrefixLike, 0),
        PathType::ImplementationSpecific => (MatchClass::PrefixLike, 1),
    };

    SpecificityKey {
        tier: if rule.is_fallback() { Tier::Fallback } else { Tier::Host },
        class,
        length: Reverse(rule.path.len()),
        type_rank,
        path: rule.path.clone(),
    }
}

/// Compare two rules by precedence.
pub fn compare(a: &Rule, b: &Rule) -> Ordering {
    classify(a).cmp(&classify(b))
}
