//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use ingress_router::routing::{Backend, PathType, RuleSet};

pub fn backend(service: &str) -> Backend {
    Backend::new(service, 80)
}

/// Single-rule rule set, the shape most scenarios use.
pub fn single(name: &str, created: u64, host: &str, path: &str, path_type: PathType) -> RuleSet {
    RuleSet::new("test", name, created).with_rule(host, path, path_type, backend(name))
}

/// Write a rule set file in the on-disk format.
pub fn write_rule_set(dir: &Path, file: &str, name: &str, created: u64, rules: &[(&str, &str, &str, &str)]) {
    let mut content = format!("namespace = \"test\"\nname = \"{}\"\ncreated = {}\n", name, created);
    for (host, path, path_type, service) in rules {
        content.push_str(&format!(
            "\n[[rules]]\nhost = \"{}\"\npath = \"{}\"\npath_type = \"{}\"\nbackend = {{ service = \"{}\", port = 80 }}\n",
            host, path, path_type, service
        ));
    }
    fs::write(dir.join(file), content).unwrap();
}
