//! Request-time redirect resolution.
//!
//! The server consults a memoized [`RedirectMap`] before touching the
//! filesystem. The map comes from the validated `dist/redirects.json`
//! artifact so that what was validated is exactly what gets served; when no
//! artifact exists (validation never ran) the map is derived live from the
//! content index, with a warning.

use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwapOption;

use crate::config::SiteConfig;
use crate::core::UrlPath;
use crate::index::ContentIndex;
use crate::log;
use crate::redirect::{RedirectMap, validate_content};

/// A resolved redirect response.
#[derive(Debug, Clone, PartialEq)]
pub struct Redirection {
    pub to: UrlPath,
    pub status: u16,
}

/// Memoized redirect table for the request loop.
#[derive(Default)]
pub struct RedirectCache {
    map: ArcSwapOption<RedirectMap>,
}

impl RedirectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the memoized map; the next request rebuilds it. Called after
    /// content edits.
    pub fn clear(&self) {
        self.map.store(None);
    }

    /// Resolve a request path against the redirect table.
    ///
    /// `accept_language` is the raw `Accept-Language` header, used to pick
    /// among locale-keyed targets.
    pub fn resolve(
        &self,
        config: &SiteConfig,
        index: &ContentIndex,
        path: &UrlPath,
        accept_language: Option<&str>,
    ) -> Result<Option<Redirection>> {
        let map = self.get_or_load(config, index)?;
        let Some(rule) = map.get(path.as_str()) else {
            return Ok(None);
        };

        let locale = negotiate_locale(accept_language);
        Ok(rule.target.resolve(locale).map(|to| Redirection {
            to: to.clone(),
            status: rule.status,
        }))
    }

    /// Current map, loading it on first use.
    pub fn get_or_load(&self, config: &SiteConfig, index: &ContentIndex) -> Result<Arc<RedirectMap>> {
        if let Some(map) = self.map.load_full() {
            return Ok(map);
        }

        let artifact = config.redirects_artifact();
        let map = if artifact.is_file() {
            RedirectMap::load(&artifact)?
        } else {
            log!("serve"; "no redirect artifact at {}; deriving redirects live (run `curo validate` to persist)", artifact.display());
            let (map, _) = validate_content(config, index)?;
            map
        };

        let map = Arc::new(map);
        self.map.store(Some(Arc::clone(&map)));
        Ok(map)
    }
}

/// Pick the redirect locale from an `Accept-Language` header.
///
/// Only the primary tag matters: anything starting with `es` selects Spanish,
/// everything else (including no header) selects English. Missing locales in
/// the target map fall back to the first available entry.
pub fn negotiate_locale(accept_language: Option<&str>) -> &'static str {
    let primary = accept_language
        .unwrap_or("")
        .split(',')
        .next()
        .unwrap_or("")
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if primary.starts_with("es") { "es" } else { "en" }
}
