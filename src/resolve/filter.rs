//! Archive candidate filtering
//!
//! Picks exactly one filename out of an upstream candidate list (release
//! assets, CI artifact paths, zip members) using the manifest's optional
//! regular expressions. Pure function; caller order is preserved, so with
//! newest-first API responses the first survivor is the newest match.

use regex::Regex;

/// Selects the first candidate that ends in `.jar`, matches `must_match`
/// (when given) and does not match `must_not_match` (when given).
pub fn select_archive<I, S>(
    candidates: I,
    must_match: Option<&Regex>,
    must_not_match: Option<&Regex>,
) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .filter(|name| name.ends_with(".jar"))
        .filter(|name| must_match.is_none_or(|re| re.is_match(name)))
        .find(|name| !must_not_match.is_some_and(|re| re.is_match(name)))
}
