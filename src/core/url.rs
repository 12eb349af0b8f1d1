//! URL path type for type-safe route handling.
//!
//! - Internal representation: always decoded, lowercase, no trailing slash
//! - Browser boundary: decode percent-encoding on input

use std::borrow::Borrow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Normalized route path.
///
/// Invariants:
/// - Always decoded (no percent-encoding)
/// - Always starts with `/`
/// - Lowercase, no trailing slash (except the root `/` itself)
///
/// This is the normal form used for redirect sources, redirect targets and
/// incoming request paths, so map lookups are exact string matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPath(Arc<str>);

impl UrlPath {
    /// Create from browser URL (decode percent-encoding, strip query string).
    pub fn from_browser(encoded: &str) -> Self {
        use percent_encoding::percent_decode_str;
        let path = encoded.split('?').next().unwrap_or(encoded);
        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| path.to_string());
        Self::from_route(&decoded)
    }

    /// Create a normalized route path. Strips query string and fragment,
    /// lowercases, ensures a leading slash and removes the trailing slash.
    pub fn from_route(raw: &str) -> Self {
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed == "/" {
            return Self(Arc::from("/"));
        }

        let path = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
        let lower = path.to_lowercase();

        let with_leading = if lower.starts_with('/') {
            lower
        } else {
            format!("/{}", lower)
        };

        let normalized = with_leading.trim_end_matches('/');
        if normalized.is_empty() {
            return Self(Arc::from("/"));
        }

        Self(Arc::from(normalized))
    }

    /// Get the decoded URL path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if path starts with the given prefix.
    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Check if the URL path is the site root.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.as_ref() == "/"
    }
}

impl std::fmt::Display for UrlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UrlPath {
    fn default() -> Self {
        Self::from_route("/")
    }
}

impl AsRef<str> for UrlPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UrlPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for UrlPath {
    fn from(s: String) -> Self {
        Self::from_route(&s)
    }
}

impl From<&str> for UrlPath {
    fn from(s: &str) -> Self {
        Self::from_route(s)
    }
}

impl PartialEq<str> for UrlPath {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for UrlPath {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for UrlPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UrlPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_route(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_route_basic() {
        let url = UrlPath::from_route("/old-python-course");
        assert_eq!(url.as_str(), "/old-python-course");
    }

    #[test]
    fn test_from_route_adds_leading_slash() {
        let url = UrlPath::from_route("old-python-course");
        assert_eq!(url.as_str(), "/old-python-course");
    }

    #[test]
    fn test_from_route_strips_trailing_slash() {
        let url = UrlPath::from_route("/old-course/");
        assert_eq!(url.as_str(), "/old-course");
    }

    #[test]
    fn test_from_route_lowercases() {
        let url = UrlPath::from_route("/Old-Course");
        assert_eq!(url.as_str(), "/old-course");
    }

    #[test]
    fn test_from_route_strips_query_and_fragment() {
        assert_eq!(UrlPath::from_route("/page?v=1").as_str(), "/page");
        assert_eq!(UrlPath::from_route("/page#section").as_str(), "/page");
        assert_eq!(UrlPath::from_route("/page?v=1#x").as_str(), "/page");
    }

    #[test]
    fn test_root() {
        assert_eq!(UrlPath::from_route("/").as_str(), "/");
        assert_eq!(UrlPath::from_route("").as_str(), "/");
        assert_eq!(UrlPath::from_route("///").as_str(), "/");
        assert!(UrlPath::from_route("/").is_root());
    }

    #[test]
    fn test_from_browser_decodes() {
        let url = UrlPath::from_browser("/landing/curso%20python");
        assert_eq!(url.as_str(), "/landing/curso python");
    }

    #[test]
    fn test_from_browser_invalid_utf8_preserved() {
        let url = UrlPath::from_browser("/x/%ff");
        assert_eq!(url.as_str(), "/x/%ff");
    }

    #[test]
    fn test_hash_and_borrow_lookup() {
        use rustc_hash::FxHashMap;

        let mut map: FxHashMap<UrlPath, u16> = FxHashMap::default();
        map.insert(UrlPath::from_route("/old"), 301);
        assert_eq!(map.get("/old"), Some(&301));
    }

    #[test]
    fn test_serialize_deserialize() {
        let url = UrlPath::from_route("/en/career-programs/python-bootcamp");
        let json = serde_json::to_string(&url).unwrap();
        assert_eq!(json, r#""/en/career-programs/python-bootcamp""#);

        let parsed: UrlPath = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, url);
    }
}
