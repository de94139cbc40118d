//! Version string comparison
//!
//! Upstream hosts report free-form version strings (`1.2.0`, `v3.1`,
//! `1.2.0-beta3`, build tags). Comparison works on the digit groups only:
//! every non-digit run becomes a separator, the remaining groups parse to an
//! integer tuple, and tuples compare lexicographically.

/// Returns true iff `latest` denotes a strictly greater version than
/// `current`.
///
/// Fails closed: when either string has no parsable digit groups the answer
/// is false ("cannot assert newer"), never an error. Callers must not read a
/// false result as "equal".
pub fn is_newer(latest: &str, current: &str) -> bool {
    match (version_tuple(latest), version_tuple(current)) {
        (Some(latest), Some(current)) => latest > current,
        _ => false,
    }
}

/// Normalizes a version string into its integer tuple.
///
/// `"1.2.0-beta3"` → `[1, 2, 0, 3]`; `"v1.2"` → `[1, 2]` (the leading
/// letter collapses into a stripped separator). Returns `None` when nothing
/// numeric remains.
///
/// Tuples of different lengths compare element-by-element with the shorter
/// tuple ordering first when it is a prefix, so `[1, 0] < [1, 0, 0]`. That
/// is slice ordering in Rust and matches tuple ordering in other languages;
/// a trailing `.0` therefore counts as newer.
pub fn version_tuple(version: &str) -> Option<Vec<u64>> {
    let groups: Vec<&str> = version
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .collect();

    if groups.is_empty() {
        return None;
    }

    groups.iter().map(|g| g.parse::<u64>().ok()).collect()
}
