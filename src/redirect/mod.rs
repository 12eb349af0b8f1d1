//! Redirect map: the validated `from -> target` table.
//!
//! The map is derived from `meta.redirects` declarations on content entries,
//! validated by [`validate`], persisted as `dist/redirects.json` and consumed
//! at request time by [`middleware`]. The persisted artifact is the single
//! source of truth for serving; the middleware only falls back to a live
//! derivation when no artifact exists.

pub mod middleware;
pub mod validate;

pub use middleware::{RedirectCache, Redirection};
pub use validate::{ValidationReport, validate_content};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::UrlPath;

/// Target of one redirect: a single path, or one path per locale for
/// locale-prefixed content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RedirectTarget {
    Single(UrlPath),
    ByLocale(BTreeMap<String, UrlPath>),
}

impl RedirectTarget {
    /// Resolve the target for a locale. Locale maps fall back to the first
    /// available value when the locale is missing.
    pub fn resolve(&self, locale: &str) -> Option<&UrlPath> {
        match self {
            Self::Single(path) => Some(path),
            Self::ByLocale(map) => map.get(locale).or_else(|| map.values().next()),
        }
    }

}

/// One validated redirect rule.
#[derive(Debug, Clone)]
pub struct RedirectRule {
    pub target: RedirectTarget,
    /// HTTP status (301 or 302).
    pub status: u16,
    /// Content file that declared the redirect.
    pub source: PathBuf,
}

/// The validated redirect table, keyed by normalized source path.
///
/// `BTreeMap` keeps the persisted artifact deterministically ordered.
#[derive(Debug, Clone, Default)]
pub struct RedirectMap {
    rules: BTreeMap<UrlPath, RedirectRule>,
}

/// Persisted artifact value. The common case (301) serializes as the bare
/// target; non-default statuses use the detailed `{to, status}` form.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ArtifactValue {
    Detailed {
        to: RedirectTarget,
        #[serde(default = "default_status")]
        status: u16,
    },
    Plain(RedirectTarget),
}

fn default_status() -> u16 {
    301
}

impl RedirectMap {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Exact lookup by normalized path.
    pub fn get(&self, path: &str) -> Option<&RedirectRule> {
        self.rules.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UrlPath, &RedirectRule)> {
        self.rules.iter()
    }

    /// Register a rule. The caller has already rejected duplicates.
    pub(crate) fn insert(&mut self, from: UrlPath, rule: RedirectRule) {
        self.rules.insert(from, rule);
    }

    pub(crate) fn source_of(&self, from: &UrlPath) -> Option<&Path> {
        self.rules.get(from).map(|r| r.source.as_path())
    }

    /// Serialize to the artifact file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let artifact: BTreeMap<&UrlPath, ArtifactValue> = self
            .rules
            .iter()
            .map(|(from, rule)| {
                let value = if rule.status == 301 {
                    ArtifactValue::Plain(rule.target.clone())
                } else {
                    ArtifactValue::Detailed {
                        to: rule.target.clone(),
                        status: rule.status,
                    }
                };
                (from, value)
            })
            .collect();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&artifact)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Load a previously validated artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let artifact: BTreeMap<String, ArtifactValue> = serde_json::from_str(&content)?;

        let rules = artifact
            .into_iter()
            .map(|(from, value)| {
                let (target, status) = match value {
                    ArtifactValue::Plain(target) => (target, 301),
                    ArtifactValue::Detailed { to, status } => (to, status),
                };
                (
                    UrlPath::from_route(&from),
                    RedirectRule {
                        target,
                        status,
                        source: path.to_path_buf(),
                    },
                )
            })
            .collect();

        Ok(Self { rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn single(path: &str) -> RedirectTarget {
        RedirectTarget::Single(UrlPath::from_route(path))
    }

    #[test]
    fn test_artifact_round_trip() {
        let mut map = RedirectMap::default();
        map.insert(
            UrlPath::from_route("/old-python-course"),
            RedirectRule {
                target: single("/en/career-programs/python-bootcamp"),
                status: 301,
                source: PathBuf::from("programs/python-bootcamp/en.yml"),
            },
        );
        map.insert(
            UrlPath::from_route("/promo"),
            RedirectRule {
                target: single("/landing/spring-promo"),
                status: 302,
                source: PathBuf::from("landings/spring-promo/_common.yml"),
            },
        );

        let tmp = TempDir::new().unwrap();
        let artifact = tmp.path().join("dist/redirects.json");
        map.save(&artifact).unwrap();

        let loaded = RedirectMap::load(&artifact).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("/promo").unwrap().status, 302);
        assert_eq!(loaded.get("/old-python-course").unwrap().status, 301);
        assert_eq!(
            loaded.get("/old-python-course").unwrap().target,
            single("/en/career-programs/python-bootcamp")
        );
    }

    #[test]
    fn test_plain_301_serializes_as_bare_string() {
        let mut map = RedirectMap::default();
        map.insert(
            UrlPath::from_route("/old"),
            RedirectRule {
                target: single("/new"),
                status: 301,
                source: PathBuf::new(),
            },
        );

        let tmp = TempDir::new().unwrap();
        let artifact = tmp.path().join("redirects.json");
        map.save(&artifact).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
        assert_eq!(raw["/old"], serde_json::json!("/new"));
    }

    #[test]
    fn test_locale_map_target_round_trip() {
        let mut by_locale = BTreeMap::new();
        by_locale.insert("en".to_string(), UrlPath::from_route("/en/career-programs/x"));
        by_locale.insert("es".to_string(), UrlPath::from_route("/es/career-programs/x"));

        let mut map = RedirectMap::default();
        map.insert(
            UrlPath::from_route("/old-x"),
            RedirectRule {
                target: RedirectTarget::ByLocale(by_locale),
                status: 301,
                source: PathBuf::new(),
            },
        );

        let tmp = TempDir::new().unwrap();
        let artifact = tmp.path().join("redirects.json");
        map.save(&artifact).unwrap();

        let loaded = RedirectMap::load(&artifact).unwrap();
        let rule = loaded.get("/old-x").unwrap();
        assert_eq!(
            rule.target.resolve("es").unwrap().as_str(),
            "/es/career-programs/x"
        );
        // Unknown locale falls back to the first available target.
        assert_eq!(
            rule.target.resolve("fr").unwrap().as_str(),
            "/en/career-programs/x"
        );
    }
}
