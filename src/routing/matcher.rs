//! Request-time route matching.
//!
//! # Responsibilities
//! - Normalize the request host and path
//! - Walk the host's pre-ordered rules and return the first acceptor
//!
//! # Design Decisions
//! - Host matching is case-insensitive, path matching is case-sensitive
//! - No re-ranking at request time: table order is precedence order
//! - O(rules for host), no backtracking
//! - Explicit `NoMatch` rather than a silent default

use crate::routing::path::{normalize_host, normalize_request_path, prefix_accepts};
use crate::routing::rule::{Backend, PathType, Rule};
use crate::routing::table::RoutingTable;

/// Outcome of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Matched(&'a Rule),
    NoMatch,
}

impl<'a> RouteMatch<'a> {
    pub fn rule(&self) -> Option<&'a Rule> {
        match self {
            RouteMatch::Matched(rule) => Some(rule),
            RouteMatch::NoMatch => None,
        }
    }

    pub fn backend(&self) -> Option<&'a Backend> {
        self.rule().map(|rule| &rule.backend)
    }

    pub fn is_match(&self) -> bool {
        matches!(self, RouteMatch::Matched(_))
    }
}

/// Does `rule` accept an already-normalized request path?
pub fn accepts(rule: &Rule, path: &str) -> bool {
    match rule.path_type {
        PathType::Exact => rule.path == path,
        PathType::Prefix | PathType::ImplementationSpecific => prefix_accepts(&rule.path, path),
    }
}

/// Find the rule that should handle `(host, path)`.
pub fn match_route<'a>(table: &'a RoutingTable, host: &str, path: &str) -> RouteMatch<'a> {
    let host = normalize_host(host);
    let path = normalize_request_path(path);

    table
        .rules_for(&host)
        .iter()
        .find(|rule| accepts(rule, &path))
        .map_or(RouteMatch::NoMatch, RouteMatch::Matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::rule::Origin;
    use std::collections::BTreeMap;

    fn rule(host: &str, path: &str, path_type: PathType, service: &str) -> Rule {
        Rule {
            host: host.to_string(),
            path: path.to_string(),
            path_type,
            backend: Backend::new(service, 80),
            origin: Origin {
                namespace: "ns".into(),
                name: service.into(),
                created: 0,
            },
            priority: None,
            extensions: BTreeMap::new(),
        }
    }

    fn table(hosts: Vec<(&str, Vec<Rule>)>, fallback: Vec<Rule>) -> RoutingTable {
        let hosts = hosts
            .into_iter()
            .map(|(h, mut rules)| {
                rules.extend(fallback.iter().cloned());
                (h.to_string(), rules)
            })
            .collect();
        RoutingTable {
            generation: 1,
            hosts,
            fallback,
        }
    }

    #[test]
    fn test_exact_predicate() {
        let r = rule("h", "/foo", PathType::Exact, "exact");
        assert!(accepts(&r, "/foo"));
        assert!(!accepts(&r, "/foo/bar"));
        assert!(!accepts(&r, "/"));
    }

    #[test]
    fn test_first_acceptor_wins() {
        let t = table(
            vec![(
                "h",
                vec![
                    rule("h", "/foo", PathType::Exact, "exact-foo"),
                    rule("h", "/foo", PathType::Prefix, "prefix-foo"),
                    rule("h", "/", PathType::Prefix, "prefix-root"),
                ],
            )],
            vec![],
        );

        assert_eq!(t.route("h", "/foo").backend().unwrap().service, "exact-foo");
        assert_eq!(t.route("h", "/foo/").backend().unwrap().service, "exact-foo");
        assert_eq!(t.route("h", "/foo/bar").backend().unwrap().service, "prefix-foo");
        assert_eq!(t.route("h", "/foobar").backend().unwrap().service, "prefix-root");
    }

    #[test]
    fn test_host_is_case_insensitive_and_port_stripped() {
        let t = table(vec![("h.example", vec![rule("h.example", "/", PathType::Prefix, "web")])], vec![]);
        assert!(t.route("H.Example:8443", "/x").is_match());
        assert!(t.route("h.example:", "/x").is_match());
    }

    #[test]
    fn test_request_query_and_fragment_ignored() {
        let t = table(vec![("h", vec![rule("h", "/search", PathType::Exact, "search")])], vec![]);
        assert!(t.route("h", "/search?q=1").is_match());
        assert!(t.route("h", "/search#top").is_match());
        assert!(!t.route("h", "/search/more?q=1").is_match());
    }

    #[test]
    fn test_unknown_host_uses_fallback() {
        let t = table(
            vec![("h", vec![rule("h", "/api", PathType::Prefix, "api")])],
            vec![rule("", "/", PathType::Prefix, "default")],
        );

        assert_eq!(t.route("other", "/api").backend().unwrap().service, "default");
        assert_eq!(t.route("h", "/api/x").backend().unwrap().service, "api");
        assert_eq!(t.route("h", "/else").backend().unwrap().service, "default");
    }

    #[test]
    fn test_no_match() {
        let t = table(vec![("h", vec![rule("h", "/api", PathType::Prefix, "api")])], vec![]);
        assert_eq!(t.route("h", "/web"), RouteMatch::NoMatch);
        assert_eq!(t.route("unknown", "/api"), RouteMatch::NoMatch);
        assert_eq!(RoutingTable::empty().route("h", "/"), RouteMatch::NoMatch);
    }

    #[test]
    fn test_match_is_idempotent() {
        let t = table(vec![("h", vec![rule("h", "/", PathType::Prefix, "web")])], vec![]);
        let first = t.route("h", "/a/b");
        for _ in 0..10 {
            assert_eq!(t.route("h", "/a/b"), first);
        }
    }
}
