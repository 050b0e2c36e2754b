//! Path and host normalization.
//!
//! Rule paths and request paths go through the same segment normalization so
//! the matcher compares like with like. Only request paths carry a query or
//! fragment; rule paths containing one are rejected at validation.

/// Normalize a path: leading slash, no repeated slashes, no trailing slash
/// (except for the root).
pub fn normalize_path(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }

    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Normalize a request path, dropping any `?query` or `#fragment` first.
pub fn normalize_request_path(raw: &str) -> String {
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    normalize_path(path)
}

/// Normalize a host for case-insensitive comparison.
///
/// Lower-cases, drops a trailing dot and strips a `:port` suffix. Bracketed
/// IPv6 literals keep their brackets.
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim();

    let host = if host.starts_with('[') {
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
            _ => host,
        }
    };

    host.trim_end_matches('.').to_ascii_lowercase()
}

/// Segment-boundary prefix test on normalized paths.
///
/// `/foo` accepts `/foo` and `/foo/bar` but never `/foobar`.
pub fn prefix_accepts(rule_path: &str, request_path: &str) -> bool {
    if rule_path == "/" {
        return true;
    }
    match request_path.strip_prefix(rule_path) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
