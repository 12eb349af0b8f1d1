//! Typed content documents.
//!
//! Every content folder holds one YAML file per locale. Only a small, stable
//! part of each document is typed here (slug, title, `meta`); the rest of the
//! document is presentation data the toolkit never interprets, except that the
//! image scanner walks raw values looking for asset paths.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::debug;

/// Valid `change_frequency` values (sitemap vocabulary).
pub const CHANGE_FREQUENCIES: [&str; 7] = [
    "always", "hourly", "daily", "weekly", "monthly", "yearly", "never",
];

/// One parsed content file. Unknown fields are ignored by design - documents
/// carry arbitrary presentation data alongside the typed head.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentDoc {
    /// Canonical identifier; falls back to the folder name when absent.
    pub slug: Option<String>,
    /// Display name.
    pub title: Option<String>,
    /// SEO / routing metadata.
    pub meta: ContentMeta,
}

/// The `meta:` block of a content file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentMeta {
    /// Paths that should redirect to this entry's canonical URL.
    pub redirects: Vec<RedirectDecl>,
    /// SEO page title.
    pub page_title: Option<String>,
    /// SEO description.
    pub description: Option<String>,
    /// Sitemap priority, must be within [0, 1].
    pub priority: Option<f64>,
    /// Sitemap change frequency, one of [`CHANGE_FREQUENCIES`].
    pub change_frequency: Option<String>,
    /// Schema-org references.
    pub schema: Option<SchemaMeta>,
}

/// Schema-org references declared by a content file. Keys must exist in the
/// schema-org registry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchemaMeta {
    /// Registry entries to include verbatim.
    pub include: Vec<String>,
    /// Registry entries to include with field overrides.
    pub overrides: BTreeMap<String, serde_yaml::Value>,
}

/// One declared redirect: either a bare source path or a full form with an
/// explicit status code.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RedirectDecl {
    /// `- /old-path` (301)
    Path(String),
    /// `- { from: /old-path, status: 302 }`
    Full {
        from: String,
        #[serde(default)]
        status: Option<u16>,
    },
}

impl RedirectDecl {
    /// Source path of the redirect.
    pub fn from(&self) -> &str {
        match self {
            Self::Path(p) => p,
            Self::Full { from, .. } => from,
        }
    }

    /// HTTP status for the redirect (default 301).
    pub fn status(&self) -> u16 {
        match self {
            Self::Path(_) => 301,
            Self::Full { status, .. } => status.unwrap_or(301),
        }
    }
}

/// Parse a content file into a typed document.
pub fn load_doc(path: &Path) -> anyhow::Result<ContentDoc> {
    let content = std::fs::read_to_string(path)?;
    let doc: ContentDoc = serde_yaml::from_str(&content)?;
    Ok(doc)
}

/// Parse a content file, degrading to `None` on any error.
///
/// Malformed individual files must never abort a scan; the failure is logged
/// at debug level and the caller falls back.
pub fn try_load_doc(path: &Path) -> Option<ContentDoc> {
    match load_doc(path) {
        Ok(doc) => Some(doc),
        Err(e) => {
            debug!("scan"; "failed to parse {}: {}", path.display(), e);
            None
        }
    }
}
