//! Base-URL and path resolution.
//!
//! # Design
//! `resolve` is a pure string function: no validation, no network, same
//! output for the same input. A path carrying its own scheme wins outright
//! over the base; anything else is joined onto the base with exactly one
//! slash between them. Bases without a scheme (bare hosts) pass through
//! untouched — the transport is the component that rejects unusable URLs,
//! as a failure outcome at dispatch time.

/// Resolve a service base URL and a request path into the final URL.
///
/// A scheme-qualified `path` (`scheme://...`) is returned verbatim and the
/// base is ignored. Otherwise `path` is appended to `base`, inserting or
/// collapsing slashes so the two are joined by exactly one.
pub fn resolve(base: &str, path: &str) -> String {
    if has_scheme(path) {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Whether `s` starts with a URL scheme per RFC 3986 (`ALPHA *( ALPHA /
/// DIGIT / "+" / "-" / "." ) "://"`).
fn has_scheme(s: &str) -> bool {
    match s.find("://") {
        Some(idx) if idx > 0 => {
            let scheme = &s[..idx];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
