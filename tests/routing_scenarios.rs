//! End-to-end routing behaviour over built tables.

use ingress_router::routing::{build, classify, PathType, RoutingTable, RuleSet};
use proptest::prelude::*;

mod common;
use common::{backend, single};

const HOST: &str = "mixed.path";

fn service(table: &RoutingTable, host: &str, path: &str) -> Option<String> {
    table.route(host, path).backend().map(|b| b.service.clone())
}

#[test]
fn test_exact_and_prefix_root() {
    let table = build(&[
        single("exact-root", 1, HOST, "/", PathType::Exact),
        single("prefix-root", 2, HOST, "/", PathType::Prefix),
    ])
    .table;

    assert_eq!(service(&table, HOST, "/").as_deref(), Some("exact-root"));
    assert_eq!(service(&table, HOST, "/bar").as_deref(), Some("prefix-root"));
}

#[test]
fn test_exact_and_prefix_foo() {
    let with_root = build(&[
        single("exact-root", 1, HOST, "/", PathType::Exact),
        single("prefix-root", 2, HOST, "/", PathType::Prefix),
        single("exact-foo", 3, HOST, "/foo", PathType::Exact),
        single("prefix-foo", 4, HOST, "/foo", PathType::Prefix),
    ])
    .table;

    assert_eq!(service(&with_root, HOST, "/foo").as_deref(), Some("exact-foo"));
    assert_eq!(service(&with_root, HOST, "/foo/bar").as_deref(), Some("prefix-foo"));
    assert_eq!(service(&with_root, HOST, "/foobar").as_deref(), Some("prefix-root"));

    let without_root = build(&[
        single("exact-foo", 3, HOST, "/foo", PathType::Exact),
        single("prefix-foo", 4, HOST, "/foo", PathType::Prefix),
    ])
    .table;
    assert_eq!(service(&without_root, HOST, "/foobar"), None);
}

#[test]
fn test_implementation_specific_with_exact_root_and_foreign_prefix() {
    let host = "my.domain.com";
    let current_frontend = RuleSet::new("test", "current-frontend", 1).with_rule(
        host,
        "/",
        PathType::Prefix,
        backend("current-frontend"),
    );
    let new_service = RuleSet::new("test", "new-service", 2)
        .with_rule(host, "/someendpoint", PathType::ImplementationSpecific, backend("new-service"))
        .with_rule(host, "/", PathType::Exact, backend("new-service"));

    let table = build(&[current_frontend, new_service]).table;

    assert_eq!(service(&table, host, "/someendpoint").as_deref(), Some("new-service"));
    assert_eq!(service(&table, host, "/somethingelse").as_deref(), Some("current-frontend"));
    assert_eq!(service(&table, host, "/").as_deref(), Some("new-service"));
}

#[test]
fn test_collision_is_deterministic_and_reported() {
    let first = single("first", 1, HOST, "/", PathType::Exact);
    let second = single("second", 2, HOST, "/", PathType::Exact);

    let a = build(&[first.clone(), second.clone()]);
    let b = build(&[second, first]);

    assert_eq!(a.table, b.table);
    assert_eq!(service(&a.table, HOST, "/").as_deref(), Some("first"));
    assert_eq!(a.conflicts, b.conflicts);
    assert_eq!(a.conflicts.len(), 1);
    assert_eq!(a.conflicts[0].dropped_origin.name, "second");
    assert_eq!(a.conflicts[0].winning_origin.name, "first");

    for _ in 0..5 {
        let again = build(&[
            single("second", 2, HOST, "/", PathType::Exact),
            single("first", 1, HOST, "/", PathType::Exact),
        ]);
        assert_eq!(again.table, a.table);
    }
}

#[test]
fn test_withdrawal_removes_only_that_rule_set() {
    let keep = RuleSet::new("test", "keep", 1)
        .with_rule(HOST, "/", PathType::Prefix, backend("keep"))
        .with_rule("other.host", "/api", PathType::Prefix, backend("keep-api"));
    let gone = RuleSet::new("test", "gone", 2)
        .with_rule(HOST, "/gone", PathType::Prefix, backend("gone"))
        .with_rule("third.host", "/", PathType::Prefix, backend("gone"));

    let before = build(&[keep.clone(), gone]).table;
    let after = build(&[keep.clone()]).table;

    assert_eq!(after, build(&[keep]).table);
    assert_eq!(service(&before, HOST, "/gone/x").as_deref(), Some("gone"));
    assert_eq!(service(&after, HOST, "/gone/x").as_deref(), Some("keep"));
    assert_eq!(service(&after, "third.host", "/"), None);

    let remaining: Vec<_> = after
        .hosts
        .values()
        .flatten()
        .map(|r| r.origin.name.as_str())
        .collect();
    assert!(remaining.iter().all(|name| *name == "keep"));
    assert_eq!(after.rule_count(), 2);
}

#[test]
fn test_catch_all_host_is_fallback_tier() {
    let table = build(&[
        single("default", 1, "", "/", PathType::Prefix),
        single("api", 2, "api.example", "/v1", PathType::Prefix),
    ])
    .table;

    assert_eq!(service(&table, "api.example", "/v1/users").as_deref(), Some("api"));
    assert_eq!(service(&table, "api.example", "/v2").as_deref(), Some("default"));
    assert_eq!(service(&table, "unknown.example", "/anything").as_deref(), Some("default"));
}

#[test]
fn test_published_order_is_strictly_increasing() {
    let table = build(&[
        single("a", 1, HOST, "/", PathType::Exact),
        single("b", 2, HOST, "/", PathType::Prefix),
        single("c", 3, HOST, "/foo", PathType::Exact),
        single("d", 4, HOST, "/foo", PathType::Prefix),
        single("e", 5, HOST, "/foo", PathType::ImplementationSpecific),
        single("f", 6, HOST, "/bar/baz", PathType::ImplementationSpecific),
        single("g", 7, "", "/", PathType::Prefix),
    ])
    .table;

    for rules in table.hosts.values() {
        for pair in rules.windows(2) {
            assert!(classify(&pair[0]) < classify(&pair[1]));
        }
    }
}

fn arb_rule_set() -> impl Strategy<Value = RuleSet> {
    let rule = (
        prop::sample::select(vec!["", "a.example", "b.example"]),
        prop::sample::select(vec!["/", "/foo", "/foo/bar", "/baz"]),
        prop::sample::select(vec![PathType::Exact, PathType::Prefix, PathType::ImplementationSpecific]),
        prop::sample::select(vec!["s1", "s2", "s3"]),
    );

    ("[a-z]{1,6}", 0u64..4, prop::collection::vec(rule, 1..5)).prop_map(|(name, created, rules)| {
        rules
            .into_iter()
            .fold(RuleSet::new("test", name, created), |rs, (host, path, path_type, svc)| {
                rs.with_rule(host, path, path_type, backend(svc))
            })
    })
}

proptest! {
    #[test]
    fn prop_build_is_order_independent(
        rule_sets in prop::collection::vec(arb_rule_set(), 1..6)
            .prop_map(|sets| {
                // Rule set names are unique in a real store.
                let mut seen = std::collections::HashSet::new();
                sets.into_iter().filter(|rs| seen.insert(rs.key())).collect::<Vec<_>>()
            })
            .prop_flat_map(|sets| (Just(sets.clone()), Just(sets).prop_shuffle()))
    ) {
        let (original, shuffled) = rule_sets;
        let a = build(&original);
        let b = build(&shuffled);
        prop_assert_eq!(&a.table, &b.table);
        prop_assert_eq!(&a.conflicts, &b.conflicts);

        for rules in a.table.hosts.values() {
            for pair in rules.windows(2) {
                prop_assert!(classify(&pair[0]) < classify(&pair[1]));
            }
        }
    }
}
