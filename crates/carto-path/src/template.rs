//! Path template primitives
//!
//! Templates are `/`-separated paths that may contain `%NAME%` name-token
//! placeholders and `${offline:online}` dual-variant tokens.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use carto_version::AccessMode;

use crate::{Location, ResolutionError};

static NAME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%([A-Z_]+)%").unwrap_or_else(|e| panic!("invalid name token pattern: {e}")));

static DUAL_VARIANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^:}]*):([^}]*)\}").unwrap_or_else(|e| panic!("invalid dual-variant pattern: {e}"))
});

/// Remove up to `count` trailing segments from `path`
///
/// A trailing `/` is dropped first unless the path is `/` itself. If the
/// path does not have more than `count` separators the result is `/`.
///
/// # Examples
/// - `("/A/B/C", 1)` → `/A/B`
/// - `("/A/B/C/", 2)` → `/A`
/// - `("/A", 1)` → `/`
#[must_use]
pub fn strip_trailing_segments(path: &str, count: usize) -> String {
    let mut path = path;
    if path.len() > 1 && path.ends_with('/') {
        path = &path[..path.len() - 1];
    }
    if count == 0 {
        return path.to_string();
    }

    if path.matches('/').count() <= count {
        return "/".to_string();
    }
    let mut end = path.len();
    for _ in 0..count {
        match path[..end].rfind('/') {
            Some(index) => end = index,
            None => return "/".to_string(),
        }
    }
    if end == 0 {
        "/".to_string()
    } else {
        path[..end].to_string()
    }
}

/// Split a dual-variant template into its offline and online forms
///
/// Every `${X:Y}` is replaced by `X` in the first result and `Y` in the
/// second. A template without such tokens is returned twice.
#[must_use]
pub fn split_dual_variant(template: &str) -> (String, String) {
    if !DUAL_VARIANT.is_match(template) {
        return (template.to_string(), template.to_string());
    }
    let offline = DUAL_VARIANT.replace_all(template, |c: &Captures<'_>| c[1].to_string());
    let online = DUAL_VARIANT.replace_all(template, |c: &Captures<'_>| c[2].to_string());
    (offline.into_owned(), online.into_owned())
}

/// The form of a dual-variant template that applies to `mode`
#[must_use]
pub fn variant_for(template: &str, mode: AccessMode) -> String {
    let (offline, online) = split_dual_variant(template);
    match mode {
        AccessMode::Offline => offline,
        AccessMode::Online => online,
    }
}

/// Names of every `%NAME%` placeholder in `path`
#[must_use]
pub fn find_unresolved_tokens(path: &str) -> BTreeSet<String> {
    NAME_TOKEN
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}

/// Substitute the tokens bound in `location` into `path`
///
/// # Errors
/// Returns [`ResolutionError::UnresolvedTokens`] if any placeholder has no
/// binding.
pub fn expand_tokens(location: &Location, path: &str) -> Result<String, ResolutionError> {
    let expanded = NAME_TOKEN.replace_all(path, |c: &Captures<'_>| match location.token(&c[1]) {
        Some(name) => name.to_string(),
        None => c[0].to_string(),
    });

    let missing = find_unresolved_tokens(&expanded);
    if missing.is_empty() {
        Ok(expanded.into_owned())
    } else {
        Err(ResolutionError::UnresolvedTokens {
            path: path.to_string(),
            tokens: missing.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strip_examples() {
        assert_eq!(strip_trailing_segments("/A/B/C", 0), "/A/B/C");
        assert_eq!(strip_trailing_segments("/A/B/C", 1), "/A/B");
        assert_eq!(strip_trailing_segments("/A/B/C", 2), "/A");
        assert_eq!(strip_trailing_segments("/A/B/C", 3), "/");
        assert_eq!(strip_trailing_segments("/A/B/C", 7), "/");
        assert_eq!(strip_trailing_segments("/A/B/C/", 1), "/A/B");
        assert_eq!(strip_trailing_segments("/A/B/C/", 0), "/A/B/C");
        assert_eq!(strip_trailing_segments("/", 0), "/");
        assert_eq!(strip_trailing_segments("/", 1), "/");
    }

    #[test]
    fn split_dual_variant_partition() {
        assert_eq!(
            split_dual_variant("/Partition${:s}/%PARTITION%"),
            ("/Partition/%PARTITION%".to_string(), "/Partitions/%PARTITION%".to_string())
        );
    }

    #[test]
    fn split_dual_variant_every_token() {
        let (offline, online) = split_dual_variant("/Partition${:s}/%PARTITION%/ResourceGroup${:s}");
        assert_eq!(offline, "/Partition/%PARTITION%/ResourceGroup");
        assert_eq!(online, "/Partitions/%PARTITION%/ResourceGroups");
    }

    #[test]
    fn split_dual_variant_full_words() {
        assert_eq!(
            split_dual_variant("/${Security:SecurityConfiguration}/%DOMAIN%"),
            ("/Security/%DOMAIN%".to_string(), "/SecurityConfiguration/%DOMAIN%".to_string())
        );
        assert_eq!(variant_for("/${A:B}", AccessMode::Online), "/B");
    }

    #[test]
    fn split_plain_template() {
        let (offline, online) = split_dual_variant("/Server/%SERVER%");
        assert_eq!(offline, online);
    }

    #[test]
    fn find_tokens_unique_sorted() {
        let tokens = find_unresolved_tokens("/%B%/x/%A%/%B%/%lower%");
        assert_eq!(tokens.into_iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn expand_all_bound() {
        let mut location = Location::from_folders(&["Server", "SSL"]);
        location.bind("SERVER", "ms1");
        assert_eq!(
            expand_tokens(&location, "/Servers/%SERVER%/SSL/%SERVER%").unwrap(),
            "/Servers/ms1/SSL/ms1"
        );
    }

    #[test]
    fn expand_reports_missing() {
        let mut location = Location::new();
        location.bind("PARTITION", "p1");
        let err = expand_tokens(&location, "/Partitions/%PARTITION%/ResourceGroups/%RESOURCEGROUP%").unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnresolvedTokens {
                path: "/Partitions/%PARTITION%/ResourceGroups/%RESOURCEGROUP%".into(),
                tokens: vec!["RESOURCEGROUP".into()],
            }
        );
    }
}
